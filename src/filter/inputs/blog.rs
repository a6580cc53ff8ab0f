use serde::Deserialize;

use crate::filter::comparison::{BooleanComparison, NumberComparison, TextComparison, TimeComparison};
use crate::filter::expr::BooleanBuilder;
use crate::filter::paths::{BoolPath, NumberPath, TextPath, TimePath};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostWhereInput {
    pub id: Option<NumberComparison<i64>>,
    pub title: Option<TextComparison>,
    pub slug: Option<TextComparison>,
    pub published: Option<BooleanComparison>,
    pub secured: Option<BooleanComparison>,
    pub content: Option<TextComparison>,
    pub created_at: Option<TimeComparison>,
    pub updated_at: Option<TimeComparison>,
    #[serde(rename = "AND")]
    pub and: Vec<PostWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<PostWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<PostWhereInput>,
}

impl PostWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.id {
            builder.and(c.build(&NumberPath::col(alias, "id")));
        }
        if let Some(c) = &self.title {
            builder.and(c.build(&TextPath::col(alias, "title")));
        }
        if let Some(c) = &self.slug {
            builder.and(c.build(&TextPath::col(alias, "slug")));
        }
        if let Some(c) = &self.published {
            builder.and(c.build(&BoolPath::col(alias, "published")));
        }
        if let Some(c) = &self.secured {
            builder.and(c.build(&BoolPath::col(alias, "secured")));
        }
        if let Some(c) = &self.content {
            builder.and(c.build(&TextPath::col(alias, "content")));
        }
        if let Some(c) = &self.created_at {
            builder.and(c.build(&TimePath::col(alias, "created_at")));
        }
        if let Some(c) = &self.updated_at {
            builder.and(c.build(&TimePath::col(alias, "updated_at")));
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
pub struct FaqWhereInput {
    pub id: Option<NumberComparison<i64>>,
    pub title: Option<TextComparison>,
    pub content: Option<TextComparison>,
    pub published: Option<BooleanComparison>,
    pub position: Option<NumberComparison<i32>>,
    pub created_at: Option<TimeComparison>,
    pub updated_at: Option<TimeComparison>,
    #[serde(rename = "AND")]
    pub and: Vec<FaqWhereInput>,
    #[serde(rename = "OR")]
    pub or: Vec<FaqWhereInput>,
    #[serde(rename = "NOT")]
    pub not: Vec<FaqWhereInput>,
}

impl FaqWhereInput {
    pub fn build(&self, alias: &str) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self.id {
            builder.and(c.build(&NumberPath::col(alias, "id")));
        }
        if let Some(c) = &self.title {
            builder.and(c.build(&TextPath::col(alias, "title")));
        }
        if let Some(c) = &self.content {
            builder.and(c.build(&TextPath::col(alias, "content")));
        }
        if let Some(c) = &self.published {
            builder.and(c.build(&BoolPath::col(alias, "published")));
        }
        if let Some(c) = &self.position {
            builder.and(c.build(&NumberPath::col(alias, "position")));
        }
        if let Some(c) = &self.created_at {
            builder.and(c.build(&TimePath::col(alias, "created_at")));
        }
        if let Some(c) = &self.updated_at {
            builder.and(c.build(&TimePath::col(alias, "updated_at")));
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
    fn published_post_by_slug() {
        let input: PostWhereInput = serde_json::from_value(json!({
            "slug": { "_eq": "how-to-donate" },
            "published": { "_eq": true }
        }))
        .unwrap();
        let (sql, params) = input.build("p").to_sql(0);
        assert_eq!(sql, "(p.\"slug\" = $1 AND p.\"published\" = $2)");
        assert_eq!(params, vec![json!("how-to-donate"), json!(true)]);
    }

    #[test]
    fn faq_position_window() {
        let input: FaqWhereInput = serde_json::from_value(json!({
            "published": { "_eq": true },
            "position": { "_lte": 5 }
        }))
        .unwrap();
        let (sql, _) = input.build("f").to_sql(0);
        assert_eq!(sql, "(f.\"published\" = $1 AND f.\"position\" <= $2)");
    }
}
