use serde::Deserialize;

use crate::filter::comparison::{
    BooleanComparison, EnumComparison, JsonComparison, NumberComparison, TextComparison,
    TimeComparison,
};
use crate::filter::expr::BooleanBuilder;
use crate::filter::inputs::donor::DonorWhereInput;
use crate::filter::inputs::organisation::OrganisationWhereInput;
use crate::filter::inputs::volunteer::VolunteerWhereInput;
use crate::filter::paths::{BoolPath, DbEnum, EnumPath, JsonPath, NumberPath, TextPath, TimePath};
use crate::models::{KitStatus, KitType};

pub type KitStatusComparison = EnumComparison<KitStatus>;
pub type KitTypeComparison = EnumComparison<KitType>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KitWhereInput {
    pub id: Option<NumberComparison<i64>>,
    pub location: Option<TextComparison>,
    pub status: Option<KitStatusComparison>,
    #[serde(rename = "type")]
    pub kit_type: Option<KitTypeComparison>,
    pub age: Option<NumberComparison<i32>>,
    pub model: Option<TextComparison>,
    pub archived: Option<BooleanComparison>,
    pub created_at: Option<TimeComparison>,
    pub updated_at: Option<TimeComparison>,
    pub attributes: Option<KitAttributesWhereInput>,
    /// Any volunteer holding a role on the kit.
    pub volunteer: Option<Box<VolunteerWhereInput>>,
    pub organisation: Option<Box<OrganisationWhereInput>>,
    pub donor: Option<Box<DonorWhereInput>>,
    #[serde(rename = "AND")]
    pub and: Vec<KitWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<KitWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<KitWhereInput>,
}

impl KitWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.age {
            builder.and(c.build(&NumberPath::col(alias, "age")));
        }
        if let Some(c) = &self.id {
            builder.and(c.build(&NumberPath::col(alias, "id")));
        }
        if let Some(c) = &self.status {
            builder.and(c.build(&EnumPath::col(alias, "status", KitStatus::TYPE_NAME)));
        }
        if let Some(c) = &self.kit_type {
            builder.and(c.build(&EnumPath::col(alias, "type", KitType::TYPE_NAME)));
        }
        if let Some(c) = &self.model {
            builder.and(c.build(&TextPath::col(alias, "model")));
        }
        if let Some(c) = &self.location {
            builder.and(c.build(&TextPath::col(alias, "location")));
        }
        if let Some(c) = &self.created_at {
            builder.and(c.build(&TimePath::col(alias, "created_at")));
        }
        if let Some(c) = &self.archived {
            builder.and(c.build(&BoolPath::col(alias, "archived")));
        }
        if let Some(c) = &self.updated_at {
            builder.and(c.build(&TimePath::col(alias, "updated_at")));
        }
        if let Some(c) = &self.attributes {
            builder.and(c.build(alias));
        }
        if let Some(organisation) = &self.organisation {
            let sub = format!("{}_o", alias);
            let inner = organisation.build(&sub);
            builder.and_exists(
                format!("organisations {}", sub),
                format!("{}.id = {}.\"organisation_id\"", sub, alias),
                inner,
            );
        }
        if let Some(volunteer) = &self.volunteer {
            let join = format!("{}_kv", alias);
            let sub = format!("{}_v", alias);
            let inner = volunteer.build(&sub);
            builder.and_exists(
                format!(
                    "kit_volunteers {} JOIN volunteers {} ON {}.id = {}.volunteer_id",
                    join, sub, sub, join
                ),
                format!("{}.kit_id = {}.id", join, alias),
                inner,
            );
        }
        if let Some(donor) = &self.donor {
            let sub = format!("{}_d", alias);
            let inner = donor.build(&sub);
            builder.and_exists(
                format!("donors {}", sub),
                format!("{}.id = {}.\"donor_id\"", sub, alias),
                inner,
            );
        }
        for node in &self.and {
            builder.and(node.build(alias));
        }
        for node in &self.or {
            builder.or(node.build(alias));
        }
        for node in &self.not {
            builder.and_not(node.build(alias));
        }
        builder
    }
}

/// Predicates over the kit's JSONB attributes document (camelCase keys).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KitAttributesWhereInput {
    pub other_type: Option<TextComparison>,
    pub pickup: Option<TextComparison>,
    pub state: Option<TextComparison>,
    pub consent: Option<TextComparison>,
    pub notes: Option<TextComparison>,
    pub status: Option<TextComparison>,
    pub pickup_availability: Option<TextComparison>,
    pub filters: Vec<JsonComparison>,
    #[serde(rename = "AND")]
    pub and: Vec<KitAttributesWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<KitAttributesWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<KitAttributesWhereInput>,
}

impl KitAttributesWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let json = JsonPath::of(alias, "attributes");
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.other_type {
            builder.and(c.build(&json.get("otherType").as_text()));
        }
        if let Some(c) = &self.pickup {
            builder.and(c.build(&json.get("pickup").as_text()));
        }
        if let Some(c) = &self.state {
            builder.and(c.build(&json.get("state").as_text()));
        }
        if let Some(c) = &self.consent {
            builder.and(c.build(&json.get("consent").as_text()));
        }
        if let Some(c) = &self.notes {
            builder.and(c.build(&json.get("notes").as_text()));
        }
        if let Some(c) = &self.pickup_availability {
            builder.and(c.build(&json.get("pickupAvailability").as_text()));
        }
        if let Some(c) = &self.status {
            builder.and(c.build(&json.get("status").as_text()));
        }
        for filter in &self.filters {
            builder.and(filter.build(&json));
        }
        for node in &self.and {
            builder.and(node.build(alias));
        }
        for node in &self.or {
            builder.or(node.build(alias));
        }
        for node in &self.not {
            builder.and_not(node.build(alias));
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enum_comparisons_cast_bound_strings() {
        let input: KitWhereInput = serde_json::from_value(json!({
            "status": { "_in": ["READY", "ALLOCATED"] },
            "type": { "_neq": "OTHER" }
        }))
        .unwrap();
        let (sql, params) = input.build("k").to_sql(0);
        assert_eq!(
            sql,
            "(k.\"status\" IN (($1)::kit_status, ($2)::kit_status) \
             AND k.\"type\" <> ($3)::kit_type)"
        );
        assert_eq!(params, vec![json!("READY"), json!("ALLOCATED"), json!("OTHER")]);
    }

    #[test]
    fn volunteer_predicate_joins_through_role_assignments() {
        let input: KitWhereInput = serde_json::from_value(json!({
            "volunteer": { "email": { "_eq": "tech@x.com" } }
        }))
        .unwrap();
        let (sql, params) = input.build("k").to_sql(0);
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM kit_volunteers k_kv JOIN volunteers k_v \
             ON k_v.id = k_kv.volunteer_id \
             WHERE k_kv.kit_id = k.id AND k_v.\"email\" = $1)"
        );
        assert_eq!(params, vec![json!("tech@x.com")]);
    }

    #[test]
    fn donor_and_organisation_traverse_their_foreign_keys() {
        let input: KitWhereInput = serde_json::from_value(json!({
            "donor": { "email": { "_contains": "gmail" } },
            "organisation": { "archived": { "_eq": false } }
        }))
        .unwrap();
        let (sql, _) = input.build("k").to_sql(0);
        assert_eq!(
            sql,
            "(EXISTS (SELECT 1 FROM organisations k_o \
             WHERE k_o.id = k.\"organisation_id\" AND k_o.\"archived\" = $1) \
             AND EXISTS (SELECT 1 FROM donors k_d \
             WHERE k_d.id = k.\"donor_id\" AND k_d.\"email\" ILIKE $2))"
        );
    }

    #[test]
    fn attribute_text_predicates_read_camel_case_keys() {
        let input: KitWhereInput = serde_json::from_value(json!({
            "attributes": {
                "pickup": { "_eq": "DROPOFF" },
                "pickupAvailability": { "_is_null": false }
            }
        }))
        .unwrap();
        let (sql, _) = input.build("k").to_sql(0);
        assert_eq!(
            sql,
            "((k.\"attributes\" #>> '{pickup}') = $1 \
             AND (k.\"attributes\" #>> '{pickupAvailability}') IS NOT NULL)"
        );
    }

    #[test]
    fn nested_where_inputs_keep_aliases_distinct() {
        let input: KitWhereInput = serde_json::from_value(json!({
            "organisation": { "volunteer": { "id": { "_eq": 7 } } }
        }))
        .unwrap();
        let (sql, _) = input.build("k").to_sql(0);
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM organisations k_o WHERE k_o.id = k.\"organisation_id\" \
             AND EXISTS (SELECT 1 FROM volunteers k_o_v \
             WHERE k_o_v.id = k_o.\"volunteer_id\" AND k_o_v.\"id\" = $1))"
        );
    }

    #[test]
    fn or_over_base_fields_follows_accumulation_order() {
        let input: KitWhereInput = serde_json::from_value(json!({
            "age": { "_gte": 3 },
            "archived": { "_eq": false },
            "OR": [ { "status": { "_eq": "RECYCLED" } } ]
        }))
        .unwrap();
        let (sql, _) = input.build("k").to_sql(0);
        assert_eq!(
            sql,
            "((k.\"age\" >= $1 AND k.\"archived\" = $2) OR k.\"status\" = ($3)::kit_status)"
        );
    }
}
