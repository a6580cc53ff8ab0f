use serde::Deserialize;

use crate::filter::comparison::{NumberComparison, TextComparison, TimeComparison};
use crate::filter::expr::BooleanBuilder;
use crate::filter::paths::{NumberPath, TextPath, TimePath};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonorWhereInput {
    pub id: Option<NumberComparison<i64>>,
    pub post_code: Option<TextComparison>,
    pub phone_number: Option<TextComparison>,
    pub name: Option<TextComparison>,
    pub email: Option<TextComparison>,
    pub referral: Option<TextComparison>,
    pub created_at: Option<TimeComparison>,
    pub updated_at: Option<TimeComparison>,
    #[serde(rename = "AND")]
    pub and: Vec<DonorWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<DonorWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<DonorWhereInput>,
}

impl DonorWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.id {
            builder.and(c.build(&NumberPath::col(alias, "id")));
        }
        if let Some(c) = &self.phone_number {
            builder.and(c.build(&TextPath::col(alias, "phone_number")));
        }
        if let Some(c) = &self.email {
            builder.and(c.build(&TextPath::col(alias, "email")));
        }
        if let Some(c) = &self.referral {
            builder.and(c.build(&TextPath::col(alias, "referral")));
        }
        if let Some(c) = &self.post_code {
            builder.and(c.build(&TextPath::col(alias, "post_code")));
        }
        if let Some(c) = &self.created_at {
            builder.and(c.build(&TimePath::col(alias, "created_at")));
        }
        if let Some(c) = &self.updated_at {
            builder.and(c.build(&TimePath::col(alias, "updated_at")));
        }
        if let Some(c) = &self.name {
            builder.and(c.build(&TextPath::col(alias, "name")));
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
    fn empty_input_matches_everything() {
        let input = DonorWhereInput::default();
        assert_eq!(input.build("d").to_sql(0).0, "1=1");
    }

    #[test]
    fn deserializes_camel_case_and_uppercase_combinators() {
        let input: DonorWhereInput = serde_json::from_value(json!({
            "postCode": { "_contains": "EC1" },
            "OR": [ { "email": { "_is_null": false } } ]
        }))
        .unwrap();
        let (sql, params) = input.build("d").to_sql(0);
        assert_eq!(sql, "(d.\"post_code\" ILIKE $1 OR d.\"email\" IS NOT NULL)");
        assert_eq!(params, vec![json!("%EC1%")]);
    }

    #[test]
    fn and_list_is_equivalent_to_conjoining_each_entry() {
        let combined: DonorWhereInput = serde_json::from_value(json!({
            "AND": [
                { "name": { "_eq": "Ada" } },
                { "referral": { "_eq": "web" } }
            ]
        }))
        .unwrap();
        let separate_a: DonorWhereInput =
            serde_json::from_value(json!({ "name": { "_eq": "Ada" } })).unwrap();
        let separate_b: DonorWhereInput =
            serde_json::from_value(json!({ "referral": { "_eq": "web" } })).unwrap();

        let mut conjoined = BooleanBuilder::new();
        conjoined.and(separate_a.build("d"));
        conjoined.and(separate_b.build("d"));

        assert_eq!(combined.build("d").to_sql(0), conjoined.to_sql(0));
    }

    #[test]
    fn or_folds_onto_populated_base_fields() {
        // Base fields accumulate first, then each OR entry attaches to
        // the whole accumulated predicate.
        let input: DonorWhereInput = serde_json::from_value(json!({
            "email": { "_eq": "a@x.com" },
            "name": { "_eq": "Ada" },
            "OR": [ { "referral": { "_eq": "web" } } ]
        }))
        .unwrap();
        let (sql, _) = input.build("d").to_sql(0);
        assert_eq!(
            sql,
            "((d.\"email\" = $1 AND d.\"name\" = $2) OR d.\"referral\" = $3)"
        );
    }

    #[test]
    fn not_entries_negate_their_subtree() {
        let input: DonorWhereInput = serde_json::from_value(json!({
            "NOT": [ { "email": { "_contains": "spam" } } ]
        }))
        .unwrap();
        let (sql, _) = input.build("d").to_sql(0);
        assert_eq!(sql, "NOT (d.\"email\" ILIKE $1)");
    }
}
