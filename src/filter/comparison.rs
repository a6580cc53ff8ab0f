//! Comparison-operator objects. Every field is optional; `build`
//! conjoins only the populated comparisons, so an instance with nothing
//! set contributes nothing (trivially true). All comparisons on one
//! instance combine with AND.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::expr::BooleanBuilder;
use super::paths::{BoolPath, DbEnum, EnumPath, JsonPath, NumberPath, TextPath, TimePath};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NumberComparison<T> {
    pub _eq: Option<T>,
    pub _neq: Option<T>,
    pub _gt: Option<T>,
    pub _gte: Option<T>,
    pub _lt: Option<T>,
    pub _lte: Option<T>,
    pub _in: Option<Vec<T>>,
    pub _nin: Option<Vec<T>>,
    pub _is_null: Option<bool>,
    /// Case-sensitive pattern over the value rendered as text.
    pub _like: Option<String>,
    /// Case-sensitive substring over the value rendered as text.
    pub _contains: Option<String>,
    /// Nested text comparison over the value rendered as text.
    pub _string: Option<Box<TextComparison>>,
}

impl<T> Default for NumberComparison<T> {
    fn default() -> Self {
        Self {
            _eq: None,
            _neq: None,
            _gt: None,
            _gte: None,
            _lt: None,
            _lte: None,
            _in: None,
            _nin: None,
            _is_null: None,
            _like: None,
            _contains: None,
            _string: None,
        }
    }
}

impl<T> NumberComparison<T>
where
    T: Copy + Into<Value>,
{
    pub fn build(&self, path: &NumberPath) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(v) = self._eq {
            builder.and_leaf(path.cmp("=", v.into()));
        }
        if let Some(v) = self._neq {
            builder.and_leaf(path.cmp("<>", v.into()));
        }
        if let Some(v) = self._gt {
            builder.and_leaf(path.cmp(">", v.into()));
        }
        if let Some(v) = self._gte {
            builder.and_leaf(path.cmp(">=", v.into()));
        }
        if let Some(v) = self._lt {
            builder.and_leaf(path.cmp("<", v.into()));
        }
        if let Some(v) = self._lte {
            builder.and_leaf(path.cmp("<=", v.into()));
        }
        if let Some(values) = &self._in {
            builder.and_leaf(path.in_list(values.iter().map(|v| (*v).into())));
        }
        if let Some(values) = &self._nin {
            builder.and_leaf(path.not_in_list(values.iter().map(|v| (*v).into())));
        }
        if let Some(null) = self._is_null {
            builder.and_leaf(path.is_null(null));
        }
        if let Some(pattern) = &self._like {
            builder.and_leaf(path.string_value().like(pattern));
        }
        if let Some(v) = &self._contains {
            builder.and_leaf(path.string_value().contains_cs(v));
        }
        if let Some(text) = &self._string {
            builder.and(text.build(&path.string_value()));
        }
        builder
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextComparison {
    pub _eq: Option<String>,
    pub _neq: Option<String>,
    pub _gt: Option<String>,
    pub _gte: Option<String>,
    pub _lt: Option<String>,
    pub _lte: Option<String>,
    pub _in: Option<Vec<String>>,
    pub _nin: Option<Vec<String>>,
    pub _is_null: Option<bool>,
    /// Case-insensitive substring.
    pub _contains: Option<String>,
    pub _ncontains: Option<String>,
    /// Case-sensitive pattern.
    pub _like: Option<String>,
    pub _nlike: Option<String>,
    /// Case-insensitive pattern.
    pub _ilike: Option<String>,
    pub _nilike: Option<String>,
    /// Regular expression.
    pub _matches: Option<String>,
    pub _nmatches: Option<String>,
    /// Nested numeric comparison over the value cast to an integer.
    pub _number: Option<Box<NumberComparison<i64>>>,
}

impl TextComparison {
    pub fn build(&self, path: &TextPath) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(v) = &self._eq {
            builder.and_leaf(path.eq(v));
        }
        if let Some(v) = &self._neq {
            builder.and_leaf(path.neq(v));
        }
        if let Some(v) = &self._gt {
            builder.and_leaf(path.gt(v));
        }
        if let Some(v) = &self._gte {
            builder.and_leaf(path.gte(v));
        }
        if let Some(v) = &self._lt {
            builder.and_leaf(path.lt(v));
        }
        if let Some(v) = &self._lte {
            builder.and_leaf(path.lte(v));
        }
        if let Some(values) = &self._in {
            builder.and_leaf(path.in_list(values));
        }
        if let Some(values) = &self._nin {
            builder.and_leaf(path.not_in_list(values));
        }
        if let Some(null) = self._is_null {
            builder.and_leaf(path.is_null(null));
        }
        if let Some(v) = &self._contains {
            builder.and_leaf(path.contains(v));
        }
        if let Some(v) = &self._ncontains {
            let mut not = BooleanBuilder::new();
            not.and_leaf(path.contains(v));
            builder.and_not(not);
        }
        if let Some(v) = &self._like {
            builder.and_leaf(path.like(v));
        }
        if let Some(v) = &self._nlike {
            builder.and_leaf(path.not_like(v));
        }
        if let Some(v) = &self._ilike {
            builder.and_leaf(path.ilike(v));
        }
        if let Some(v) = &self._nilike {
            builder.and_leaf(path.not_ilike(v));
        }
        if let Some(v) = &self._matches {
            builder.and_leaf(path.matches(v));
        }
        if let Some(v) = &self._nmatches {
            builder.and_leaf(path.not_matches(v));
        }
        if let Some(number) = &self._number {
            builder.and(number.build(&path.cast_to_number()));
        }
        builder
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnumComparison<T> {
    pub _eq: Option<T>,
    pub _neq: Option<T>,
    pub _gt: Option<T>,
    pub _gte: Option<T>,
    pub _lt: Option<T>,
    pub _lte: Option<T>,
    pub _in: Option<Vec<T>>,
    pub _nin: Option<Vec<T>>,
    pub _is_null: Option<bool>,
}

impl<T> Default for EnumComparison<T> {
    fn default() -> Self {
        Self {
            _eq: None,
            _neq: None,
            _gt: None,
            _gte: None,
            _lt: None,
            _lte: None,
            _in: None,
            _nin: None,
            _is_null: None,
        }
    }
}

impl<T: DbEnum> EnumComparison<T> {
    pub fn build(&self, path: &EnumPath) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(v) = &self._eq {
            builder.and_leaf(path.cmp("=", v));
        }
        if let Some(v) = &self._neq {
            builder.and_leaf(path.cmp("<>", v));
        }
        if let Some(v) = &self._gt {
            builder.and_leaf(path.cmp(">", v));
        }
        if let Some(v) = &self._gte {
            builder.and_leaf(path.cmp(">=", v));
        }
        if let Some(v) = &self._lt {
            builder.and_leaf(path.cmp("<", v));
        }
        if let Some(v) = &self._lte {
            builder.and_leaf(path.cmp("<=", v));
        }
        if let Some(values) = &self._in {
            builder.and_leaf(path.in_list(values));
        }
        if let Some(values) = &self._nin {
            builder.and_leaf(path.not_in_list(values));
        }
        if let Some(null) = self._is_null {
            builder.and_leaf(path.is_null(null));
        }
        builder
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimeComparison {
    pub _eq: Option<DateTime<Utc>>,
    pub _neq: Option<DateTime<Utc>>,
    pub _gt: Option<DateTime<Utc>>,
    pub _gte: Option<DateTime<Utc>>,
    pub _lt: Option<DateTime<Utc>>,
    pub _lte: Option<DateTime<Utc>>,
    pub _in: Option<Vec<DateTime<Utc>>>,
    pub _nin: Option<Vec<DateTime<Utc>>>,
    pub _is_null: Option<bool>,
}

impl TimeComparison {
    pub fn build(&self, path: &TimePath) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(v) = &self._eq {
            builder.and_leaf(path.cmp("=", v));
        }
        if let Some(v) = &self._neq {
            builder.and_leaf(path.cmp("<>", v));
        }
        if let Some(v) = &self._gt {
            builder.and_leaf(path.cmp(">", v));
        }
        if let Some(v) = &self._gte {
            builder.and_leaf(path.cmp(">=", v));
        }
        if let Some(v) = &self._lt {
            builder.and_leaf(path.cmp("<", v));
        }
        if let Some(v) = &self._lte {
            builder.and_leaf(path.cmp("<=", v));
        }
        if let Some(values) = &self._in {
            builder.and_leaf(path.in_list(values));
        }
        if let Some(values) = &self._nin {
            builder.and_leaf(path.not_in_list(values));
        }
        if let Some(null) = self._is_null {
            builder.and_leaf(path.is_null(null));
        }
        builder
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BooleanComparison {
    pub _eq: Option<bool>,
    pub _neq: Option<bool>,
    pub _in: Option<Vec<bool>>,
    pub _nin: Option<Vec<bool>>,
    pub _is_null: Option<bool>,
}

impl BooleanComparison {
    pub fn build(&self, path: &BoolPath) -> BooleanBuilder {
        let mut builder = BooleanBuilder::new();
        if let Some(v) = self._eq {
            builder.and_leaf(path.eq(v));
        }
        if let Some(v) = self._neq {
            builder.and_leaf(path.neq(v));
        }
        if let Some(values) = &self._in {
            builder.and_leaf(path.in_list(values));
        }
        if let Some(values) = &self._nin {
            builder.and_leaf(path.not_in_list(values));
        }
        if let Some(null) = self._is_null {
            builder.and_leaf(path.is_null(null));
        }
        builder
    }
}

/// Comparison against a dot-addressed key inside a JSONB document.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonComparison {
    pub key: String,
    #[serde(default)]
    pub _int: Option<NumberComparison<i32>>,
    #[serde(default)]
    pub _long: Option<NumberComparison<i64>>,
    #[serde(default)]
    pub _text: Option<TextComparison>,
    #[serde(default)]
    pub _bool: Option<BooleanComparison>,
    #[serde(default)]
    pub _length: Option<NumberComparison<i32>>,
    #[serde(default)]
    pub _in: Option<Vec<Value>>,
    #[serde(default)]
    pub _nin: Option<Vec<Value>>,
}

impl JsonComparison {
    pub fn build(&self, path: &JsonPath) -> BooleanBuilder {
        let json = path.get(&self.key);
        let mut builder = BooleanBuilder::new();
        if let Some(c) = &self._int {
            builder.and(c.build(&json.as_int()));
        }
        if let Some(c) = &self._long {
            builder.and(c.build(&json.as_long()));
        }
        if let Some(c) = &self._text {
            builder.and(c.build(&json.as_text()));
        }
        if let Some(c) = &self._length {
            builder.and(c.build(&json.length()));
        }
        if let Some(values) = &self._in {
            builder.and_leaf(json.contains(values));
        }
        if let Some(values) = &self._nin {
            let mut not = BooleanBuilder::new();
            not.and_leaf(json.contains(values));
            builder.and_not(not);
        }
        if let Some(c) = &self._bool {
            builder.and(c.build(&json.as_bool()));
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_comparison_is_identity() {
        let cmp = TextComparison::default();
        let built = cmp.build(&TextPath::col("d", "name"));
        assert!(built.is_empty());
        assert_eq!(built.to_sql(0).0, "1=1");
    }

    #[test]
    fn populated_fields_conjoin_with_and() {
        let cmp = TextComparison {
            _gte: Some("a".into()),
            _lt: Some("m".into()),
            ..Default::default()
        };
        let (sql, params) = cmp.build(&TextPath::col("d", "name")).to_sql(0);
        assert_eq!(sql, "(d.\"name\" >= $1 AND d.\"name\" < $2)");
        assert_eq!(params, vec![json!("a"), json!("m")]);
    }

    #[test]
    fn is_null_true_matches_null_rows_only() {
        let cmp = TextComparison { _is_null: Some(true), ..Default::default() };
        let (sql, _) = cmp.build(&TextPath::col("d", "email")).to_sql(0);
        assert_eq!(sql, "d.\"email\" IS NULL");
    }

    #[test]
    fn is_null_false_matches_non_null_rows_only() {
        let cmp = TextComparison { _is_null: Some(false), ..Default::default() };
        let (sql, _) = cmp.build(&TextPath::col("d", "email")).to_sql(0);
        assert_eq!(sql, "d.\"email\" IS NOT NULL");
    }

    #[test]
    fn contains_is_case_insensitive_substring() {
        let cmp = TextComparison { _contains: Some("Foo".into()), ..Default::default() };
        let (sql, params) = cmp.build(&TextPath::col("d", "name")).to_sql(0);
        assert_eq!(sql, "d.\"name\" ILIKE $1");
        assert_eq!(params, vec![json!("%Foo%")]);
    }

    #[test]
    fn ncontains_negates_the_substring_match() {
        let cmp = TextComparison { _ncontains: Some("foo".into()), ..Default::default() };
        let (sql, _) = cmp.build(&TextPath::col("d", "name")).to_sql(0);
        assert_eq!(sql, "NOT (d.\"name\" ILIKE $1)");
    }

    #[test]
    fn text_number_reinterprets_as_integer() {
        let cmp = TextComparison {
            _number: Some(Box::new(NumberComparison { _gt: Some(10), ..Default::default() })),
            ..Default::default()
        };
        let (sql, params) = cmp.build(&TextPath::col("k", "location")).to_sql(0);
        assert_eq!(sql, "(k.\"location\")::bigint > $1");
        assert_eq!(params, vec![json!(10)]);
    }

    #[test]
    fn number_string_reinterprets_as_text() {
        let cmp: NumberComparison<i64> = NumberComparison {
            _string: Some(Box::new(TextComparison {
                _contains: Some("42".into()),
                ..Default::default()
            })),
            ..Default::default()
        };
        let (sql, params) = cmp.build(&NumberPath::col("k", "id")).to_sql(0);
        assert_eq!(sql, "(k.\"id\")::text ILIKE $1");
        assert_eq!(params, vec![json!("%42%")]);
    }

    #[test]
    fn number_contains_is_case_sensitive() {
        let cmp: NumberComparison<i64> = NumberComparison {
            _contains: Some("4".into()),
            ..Default::default()
        };
        let (sql, _) = cmp.build(&NumberPath::col("k", "id")).to_sql(0);
        assert_eq!(sql, "(k.\"id\")::text LIKE $1");
    }

    #[test]
    fn in_list_expands_each_value() {
        let cmp: NumberComparison<i64> = NumberComparison {
            _in: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        let (sql, params) = cmp.build(&NumberPath::col("k", "id")).to_sql(0);
        assert_eq!(sql, "k.\"id\" IN ($1, $2, $3)");
        assert_eq!(params, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn json_comparison_applies_sub_comparisons_to_the_key() {
        let cmp = JsonComparison {
            key: "capacity.laptops".into(),
            _int: Some(NumberComparison { _gte: Some(1), ..Default::default() }),
            _long: None,
            _text: None,
            _bool: None,
            _length: None,
            _in: None,
            _nin: None,
        };
        let (sql, params) = cmp.build(&JsonPath::of("v", "attributes")).to_sql(0);
        assert_eq!(sql, "(v.\"attributes\" #>> '{capacity,laptops}')::bigint >= $1");
        assert_eq!(params, vec![json!(1)]);
    }

    #[test]
    fn json_nin_negates_containment() {
        let cmp = JsonComparison {
            key: "status".into(),
            _int: None,
            _long: None,
            _text: None,
            _bool: None,
            _length: None,
            _in: None,
            _nin: Some(vec![json!("RETIRED")]),
        };
        let (sql, _) = cmp.build(&JsonPath::of("k", "attributes")).to_sql(0);
        assert_eq!(sql, "NOT (k.\"attributes\" #> '{status}' @> ($1)::jsonb)");
    }

    #[test]
    fn comparisons_deserialize_from_graphql_style_keys() {
        let cmp: TextComparison =
            serde_json::from_value(json!({ "_eq": "a", "_is_null": false })).unwrap();
        assert_eq!(cmp._eq.as_deref(), Some("a"));
        assert_eq!(cmp._is_null, Some(false));
    }
}
