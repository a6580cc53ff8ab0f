use serde::Deserialize;

use crate::filter::comparison::{
    BooleanComparison, JsonComparison, NumberComparison, TextComparison, TimeComparison,
};
use crate::filter::expr::BooleanBuilder;
use crate::filter::inputs::volunteer::VolunteerWhereInput;
use crate::filter::paths::{BoolPath, JsonPath, NumberPath, TextPath, TimePath};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganisationWhereInput {
    pub id: Option<NumberComparison<i64>>,
    pub website: Option<TextComparison>,
    pub phone_number: Option<TextComparison>,
    pub contact: Option<TextComparison>,
    pub name: Option<TextComparison>,
    pub archived: Option<BooleanComparison>,
    /// Owning volunteer, traversed through the volunteer_id link.
    pub volunteer: Option<Box<VolunteerWhereInput>>,
    pub email: Option<TextComparison>,
    pub created_at: Option<TimeComparison>,
    pub updated_at: Option<TimeComparison>,
    pub attributes: Option<OrganisationAttributesWhereInput>,
    #[serde(rename = "AND")]
    pub and: Vec<OrganisationWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<OrganisationWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<OrganisationWhereInput>,
}

impl OrganisationWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.id {
            builder.and(c.build(&NumberPath::col(alias, "id")));
        }
        if let Some(c) = &self.name {
            builder.and(c.build(&TextPath::col(alias, "name")));
        }
        if let Some(c) = &self.contact {
            builder.and(c.build(&TextPath::col(alias, "contact")));
        }
        if let Some(c) = &self.email {
            builder.and(c.build(&TextPath::col(alias, "email")));
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
        if let Some(c) = &self.website {
            builder.and(c.build(&TextPath::col(alias, "website")));
        }
        if let Some(c) = &self.attributes {
            builder.and(c.build(alias));
        }
        if let Some(c) = &self.archived {
            builder.and(c.build(&BoolPath::col(alias, "archived")));
        }
        if let Some(volunteer) = &self.volunteer {
            let sub = format!("{}_v", alias);
            let inner = volunteer.build(&sub);
            builder.and_exists(
                format!("volunteers {}", sub),
                format!("{}.id = {}.\"volunteer_id\"", sub, alias),
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

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganisationAttributesWhereInput {
    pub filters: Vec<JsonComparison>,
    #[serde(rename = "AND")]
    pub and: Vec<OrganisationAttributesWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<OrganisationAttributesWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<OrganisationAttributesWhereInput>,
}

impl OrganisationAttributesWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let json = JsonPath::of(alias, "attributes");
        let mut builder = BooleanBuilder::new();
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
    fn owner_predicate_renders_correlated_exists() {
        let input: OrganisationWhereInput = serde_json::from_value(json!({
            "archived": { "_eq": false },
            "volunteer": { "email": { "_eq": "owner@x.com" } }
        }))
        .unwrap();
        let (sql, params) = input.build("o").to_sql(0);
        assert_eq!(
            sql,
            "(o.\"archived\" = $1 AND EXISTS (SELECT 1 FROM volunteers o_v \
             WHERE o_v.id = o.\"volunteer_id\" AND o_v.\"email\" = $2))"
        );
        assert_eq!(params, vec![json!(false), json!("owner@x.com")]);
    }

    #[test]
    fn attribute_filters_target_the_requested_capacity() {
        let input: OrganisationWhereInput = serde_json::from_value(json!({
            "attributes": {
                "filters": [ { "key": "request.laptops", "_int": { "_gt": 0 } } ]
            }
        }))
        .unwrap();
        let (sql, _) = input.build("o").to_sql(0);
        assert_eq!(sql, "(o.\"attributes\" #>> '{request,laptops}')::bigint > $1");
    }
}
