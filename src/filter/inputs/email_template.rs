use serde::Deserialize;

use crate::filter::comparison::{BooleanComparison, NumberComparison, TextComparison, TimeComparison};
use crate::filter::expr::BooleanBuilder;
use crate::filter::paths::{BoolPath, NumberPath, TextPath, TimePath};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailTemplateWhereInput {
    pub id: Option<NumberComparison<i64>>,
    pub active: Option<BooleanComparison>,
    pub body: Option<TextComparison>,
    pub subject: Option<TextComparison>,
    pub created_at: Option<TimeComparison>,
    pub updated_at: Option<TimeComparison>,
    #[serde(rename = "AND")]
    pub and: Vec<EmailTemplateWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<EmailTemplateWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<EmailTemplateWhereInput>,
}

impl EmailTemplateWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.id {
            builder.and(c.build(&NumberPath::col(alias, "id")));
        }
        if let Some(c) = &self.active {
            builder.and(c.build(&BoolPath::col(alias, "active")));
        }
        if let Some(c) = &self.body {
            builder.and(c.build(&TextPath::col(alias, "body")));
        }
        if let Some(c) = &self.created_at {
            builder.and(c.build(&TimePath::col(alias, "created_at")));
        }
        if let Some(c) = &self.updated_at {
            builder.and(c.build(&TimePath::col(alias, "updated_at")));
        }
        if let Some(c) = &self.subject {
            builder.and(c.build(&TextPath::col(alias, "subject")));
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
    fn active_templates_by_subject() {
        let input: EmailTemplateWhereInput = serde_json::from_value(json!({
            "active": { "_eq": true },
            "subject": { "_contains": "assigned" }
        }))
        .unwrap();
        let (sql, params) = input.build("e").to_sql(0);
        assert_eq!(sql, "(e.\"active\" = $1 AND e.\"subject\" ILIKE $2)");
        assert_eq!(params, vec![json!(true), json!("%assigned%")]);
    }
}
