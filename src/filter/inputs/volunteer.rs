use serde::Deserialize;

use crate::filter::comparison::{
    BooleanComparison, JsonComparison, NumberComparison, TextComparison, TimeComparison,
};
use crate::filter::expr::BooleanBuilder;
use crate::filter::paths::{JsonPath, NumberPath, TextPath, TimePath};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerWhereInput {
    pub id: Option<NumberComparison<i64>>,
    pub name: Option<TextComparison>,
    pub phone_number: Option<TextComparison>,
    pub email: Option<TextComparison>,
    pub expertise: Option<TextComparison>,
    pub sub_group: Option<TextComparison>,
    pub storage: Option<TextComparison>,
    pub transport: Option<TextComparison>,
    pub post_code: Option<TextComparison>,
    pub availability: Option<TextComparison>,
    pub created_at: Option<TimeComparison>,
    pub updated_at: Option<TimeComparison>,
    pub attributes: Option<VolunteerAttributesWhereInput>,
    #[serde(rename = "AND")]
    pub and: Vec<VolunteerWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<VolunteerWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<VolunteerWhereInput>,
}

impl VolunteerWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.id {
            builder.and(c.build(&NumberPath::col(alias, "id")));
        }
        if let Some(c) = &self.email {
            builder.and(c.build(&TextPath::col(alias, "email")));
        }
        if let Some(c) = &self.name {
            builder.and(c.build(&TextPath::col(alias, "name")));
        }
        if let Some(c) = &self.created_at {
            builder.and(c.build(&TimePath::col(alias, "created_at")));
        }
        if let Some(c) = &self.updated_at {
            builder.and(c.build(&TimePath::col(alias, "updated_at")));
        }
        if let Some(c) = &self.phone_number {
            builder.and(c.build(&TextPath::col(alias, "phone_number")));
        }
        if let Some(c) = &self.expertise {
            builder.and(c.build(&TextPath::col(alias, "expertise")));
        }
        if let Some(c) = &self.sub_group {
            builder.and(c.build(&TextPath::col(alias, "sub_group")));
        }
        if let Some(c) = &self.storage {
            builder.and(c.build(&TextPath::col(alias, "storage")));
        }
        if let Some(c) = &self.transport {
            builder.and(c.build(&TextPath::col(alias, "transport")));
        }
        if let Some(c) = &self.post_code {
            builder.and(c.build(&TextPath::col(alias, "post_code")));
        }
        if let Some(c) = &self.availability {
            builder.and(c.build(&TextPath::col(alias, "availability")));
        }
        if let Some(c) = &self.attributes {
            builder.and(c.build(alias));
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

/// Predicates over the volunteer's JSONB attributes document. Keys inside
/// the document are camelCase.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerAttributesWhereInput {
    pub drop_off_availability: Option<TextComparison>,
    pub has_capacity: Option<BooleanComparison>,
    pub capacity: Option<VolunteerCapacityWhereInput>,
    pub filters: Vec<JsonComparison>,
    #[serde(rename = "AND")]
    pub and: Vec<VolunteerAttributesWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<VolunteerAttributesWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<VolunteerAttributesWhereInput>,
}

impl VolunteerAttributesWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let json = JsonPath::of(alias, "attributes");
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.drop_off_availability {
            builder.and(c.build(&json.get("dropOffAvailability").as_text()));
        }
        if let Some(c) = &self.capacity {
            builder.and(c.build(alias));
        }
        if let Some(c) = &self.has_capacity {
            builder.and(c.build(&json.get("hasCapacity").as_bool()));
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

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerCapacityWhereInput {
    pub phones: Option<NumberComparison<i32>>,
    pub tablets: Option<NumberComparison<i32>>,
    pub laptops: Option<NumberComparison<i32>>,
    pub all_in_ones: Option<NumberComparison<i32>>,
    pub desktops: Option<NumberComparison<i32>>,
    pub other: Option<NumberComparison<i32>>,
    pub chromebooks: Option<NumberComparison<i32>>,
    pub filters: Vec<JsonComparison>,
    #[serde(rename = "AND")]
    pub and: Vec<VolunteerCapacityWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<VolunteerCapacityWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<VolunteerCapacityWhereInput>,
}

impl VolunteerCapacityWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let json = JsonPath::of(alias, "attributes");
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.phones {
            builder.and(c.build(&json.get("capacity.phones").as_int()));
        }
        if let Some(c) = &self.tablets {
            builder.and(c.build(&json.get("capacity.tablets").as_int()));
        }
        if let Some(c) = &self.laptops {
            builder.and(c.build(&json.get("capacity.laptops").as_int()));
        }
        if let Some(c) = &self.all_in_ones {
            builder.and(c.build(&json.get("capacity.allInOnes").as_int()));
        }
        if let Some(c) = &self.desktops {
            builder.and(c.build(&json.get("capacity.desktops").as_int()));
        }
        if let Some(c) = &self.other {
            builder.and(c.build(&json.get("capacity.other").as_int()));
        }
        if let Some(c) = &self.chromebooks {
            builder.and(c.build(&json.get("capacity.chromebooks").as_int()));
        }
        for filter in &self.filters {
            builder.and(filter.build(&json.get("capacity")));
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
    fn capacity_predicates_descend_into_the_document() {
        let input: VolunteerWhereInput = serde_json::from_value(json!({
            "attributes": {
                "hasCapacity": { "_eq": true },
                "capacity": { "laptops": { "_gte": 2 } }
            }
        }))
        .unwrap();
        let (sql, params) = input.build("v").to_sql(0);
        assert_eq!(
            sql,
            "((v.\"attributes\" #>> '{capacity,laptops}')::bigint >= $1 \
             AND (v.\"attributes\" #>> '{hasCapacity}')::boolean = $2)"
        );
        assert_eq!(params, vec![json!(2), json!(true)]);
    }

    #[test]
    fn other_and_chromebook_counts_are_filterable() {
        let input: VolunteerCapacityWhereInput = serde_json::from_value(json!({
            "other": { "_gt": 0 },
            "chromebooks": { "_gte": 1 }
        }))
        .unwrap();
        let (sql, params) = input.build("v").to_sql(0);
        assert_eq!(
            sql,
            "((v.\"attributes\" #>> '{capacity,other}')::bigint > $1 \
             AND (v.\"attributes\" #>> '{capacity,chromebooks}')::bigint >= $2)"
        );
        assert_eq!(params, vec![json!(0), json!(1)]);
    }

    #[test]
    fn json_filters_are_relative_to_the_capacity_node() {
        let input: VolunteerAttributesWhereInput = serde_json::from_value(json!({
            "capacity": {
                "filters": [ { "key": "phones", "_int": { "_gt": 0 } } ]
            }
        }))
        .unwrap();
        let (sql, _) = input.build("v").to_sql(0);
        assert_eq!(sql, "(v.\"attributes\" #>> '{capacity,phones}')::bigint > $1");
    }

    #[test]
    fn scalar_and_attribute_predicates_conjoin() {
        let input: VolunteerWhereInput = serde_json::from_value(json!({
            "postCode": { "_contains": "SW1" },
            "attributes": { "dropOffAvailability": { "_ncontains": "weekend" } }
        }))
        .unwrap();
        let (sql, _) = input.build("v").to_sql(0);
        assert_eq!(
            sql,
            "(v.\"post_code\" ILIKE $1 \
             AND NOT ((v.\"attributes\" #>> '{dropOffAvailability}') ILIKE $2))"
        );
    }
}
