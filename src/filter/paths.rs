use serde_json::Value;

use super::expr::Leaf;

/// Database representation of an enum-typed column. Comparisons bind the
/// string form and cast the placeholder to the Postgres enum type, so
/// ordering follows the enum's declaration order.
pub trait DbEnum: Clone {
    const TYPE_NAME: &'static str;
    fn as_db_str(&self) -> &'static str;
}

fn quoted(alias: &str, column: &str) -> String {
    format!("{}.\"{}\"", alias, column)
}

/// Escape LIKE wildcards so user input matches literally inside a
/// generated pattern.
pub(crate) fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '%' || c == '_' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A SQL expression yielding text.
#[derive(Debug, Clone)]
pub struct TextPath(pub String);

impl TextPath {
    pub fn col(alias: &str, column: &str) -> Self {
        Self(quoted(alias, column))
    }

    pub fn eq(&self, v: &str) -> Leaf {
        Leaf::new(format!("{} = ?", self.0), vec![Value::from(v)])
    }

    pub fn neq(&self, v: &str) -> Leaf {
        Leaf::new(format!("{} <> ?", self.0), vec![Value::from(v)])
    }

    pub fn gt(&self, v: &str) -> Leaf {
        Leaf::new(format!("{} > ?", self.0), vec![Value::from(v)])
    }

    pub fn gte(&self, v: &str) -> Leaf {
        Leaf::new(format!("{} >= ?", self.0), vec![Value::from(v)])
    }

    pub fn lt(&self, v: &str) -> Leaf {
        Leaf::new(format!("{} < ?", self.0), vec![Value::from(v)])
    }

    pub fn lte(&self, v: &str) -> Leaf {
        Leaf::new(format!("{} <= ?", self.0), vec![Value::from(v)])
    }

    pub fn is_null(&self, null: bool) -> Leaf {
        if null {
            Leaf::fixed(format!("{} IS NULL", self.0))
        } else {
            Leaf::fixed(format!("{} IS NOT NULL", self.0))
        }
    }

    pub fn in_list(&self, values: &[String]) -> Leaf {
        in_list_leaf(&self.0, values.iter().map(|v| Value::from(v.as_str())), "")
    }

    pub fn not_in_list(&self, values: &[String]) -> Leaf {
        not_in_list_leaf(&self.0, values.iter().map(|v| Value::from(v.as_str())), "")
    }

    /// Case-insensitive substring match.
    pub fn contains(&self, v: &str) -> Leaf {
        Leaf::new(format!("{} ILIKE ?", self.0), vec![Value::from(format!("%{}%", escape_like(v)))])
    }

    /// Case-sensitive substring match.
    pub fn contains_cs(&self, v: &str) -> Leaf {
        Leaf::new(format!("{} LIKE ?", self.0), vec![Value::from(format!("%{}%", escape_like(v)))])
    }

    pub fn like(&self, pattern: &str) -> Leaf {
        Leaf::new(format!("{} LIKE ?", self.0), vec![Value::from(pattern)])
    }

    pub fn not_like(&self, pattern: &str) -> Leaf {
        Leaf::new(format!("{} NOT LIKE ?", self.0), vec![Value::from(pattern)])
    }

    pub fn ilike(&self, pattern: &str) -> Leaf {
        Leaf::new(format!("{} ILIKE ?", self.0), vec![Value::from(pattern)])
    }

    pub fn not_ilike(&self, pattern: &str) -> Leaf {
        Leaf::new(format!("{} NOT ILIKE ?", self.0), vec![Value::from(pattern)])
    }

    pub fn matches(&self, regex: &str) -> Leaf {
        Leaf::new(format!("{} ~ ?", self.0), vec![Value::from(regex)])
    }

    pub fn not_matches(&self, regex: &str) -> Leaf {
        Leaf::new(format!("{} !~ ?", self.0), vec![Value::from(regex)])
    }

    /// Reinterpret the text value as an integer for nested numeric
    /// comparison.
    pub fn cast_to_number(&self) -> NumberPath {
        NumberPath(format!("({})::bigint", self.0))
    }
}

/// A SQL expression yielding a number.
#[derive(Debug, Clone)]
pub struct NumberPath(pub String);

impl NumberPath {
    pub fn col(alias: &str, column: &str) -> Self {
        Self(quoted(alias, column))
    }

    pub fn cmp(&self, op: &str, v: Value) -> Leaf {
        Leaf::new(format!("{} {} ?", self.0, op), vec![v])
    }

    pub fn is_null(&self, null: bool) -> Leaf {
        if null {
            Leaf::fixed(format!("{} IS NULL", self.0))
        } else {
            Leaf::fixed(format!("{} IS NOT NULL", self.0))
        }
    }

    pub fn in_list(&self, values: impl Iterator<Item = Value>) -> Leaf {
        in_list_leaf(&self.0, values, "")
    }

    pub fn not_in_list(&self, values: impl Iterator<Item = Value>) -> Leaf {
        not_in_list_leaf(&self.0, values, "")
    }

    /// The numeric value rendered as text, for dual-typed comparisons.
    pub fn string_value(&self) -> TextPath {
        TextPath(format!("({})::text", self.0))
    }
}

/// A SQL expression yielding a boolean.
#[derive(Debug, Clone)]
pub struct BoolPath(pub String);

impl BoolPath {
    pub fn col(alias: &str, column: &str) -> Self {
        Self(quoted(alias, column))
    }

    pub fn eq(&self, v: bool) -> Leaf {
        Leaf::new(format!("{} = ?", self.0), vec![Value::from(v)])
    }

    pub fn neq(&self, v: bool) -> Leaf {
        Leaf::new(format!("{} <> ?", self.0), vec![Value::from(v)])
    }

    pub fn is_null(&self, null: bool) -> Leaf {
        if null {
            Leaf::fixed(format!("{} IS NULL", self.0))
        } else {
            Leaf::fixed(format!("{} IS NOT NULL", self.0))
        }
    }

    pub fn in_list(&self, values: &[bool]) -> Leaf {
        in_list_leaf(&self.0, values.iter().map(|v| Value::from(*v)), "")
    }

    pub fn not_in_list(&self, values: &[bool]) -> Leaf {
        not_in_list_leaf(&self.0, values.iter().map(|v| Value::from(*v)), "")
    }
}

/// A SQL expression yielding a timestamp. Values bind as RFC3339 strings
/// and the placeholder is cast server-side.
#[derive(Debug, Clone)]
pub struct TimePath(pub String);

impl TimePath {
    pub fn col(alias: &str, column: &str) -> Self {
        Self(quoted(alias, column))
    }

    pub fn cmp(&self, op: &str, v: &chrono::DateTime<chrono::Utc>) -> Leaf {
        Leaf::new(
            format!("{} {} (?)::timestamptz", self.0, op),
            vec![Value::from(v.to_rfc3339())],
        )
    }

    pub fn is_null(&self, null: bool) -> Leaf {
        if null {
            Leaf::fixed(format!("{} IS NULL", self.0))
        } else {
            Leaf::fixed(format!("{} IS NOT NULL", self.0))
        }
    }

    pub fn in_list(&self, values: &[chrono::DateTime<chrono::Utc>]) -> Leaf {
        in_list_leaf(&self.0, values.iter().map(|v| Value::from(v.to_rfc3339())), "::timestamptz")
    }

    pub fn not_in_list(&self, values: &[chrono::DateTime<chrono::Utc>]) -> Leaf {
        not_in_list_leaf(&self.0, values.iter().map(|v| Value::from(v.to_rfc3339())), "::timestamptz")
    }
}

/// A SQL expression yielding a Postgres enum.
#[derive(Debug, Clone)]
pub struct EnumPath {
    pub sql: String,
    pub type_name: &'static str,
}

impl EnumPath {
    pub fn col(alias: &str, column: &str, type_name: &'static str) -> Self {
        Self { sql: quoted(alias, column), type_name }
    }

    pub fn cmp<T: DbEnum>(&self, op: &str, v: &T) -> Leaf {
        Leaf::new(
            format!("{} {} (?)::{}", self.sql, op, self.type_name),
            vec![Value::from(v.as_db_str())],
        )
    }

    pub fn is_null(&self, null: bool) -> Leaf {
        if null {
            Leaf::fixed(format!("{} IS NULL", self.sql))
        } else {
            Leaf::fixed(format!("{} IS NOT NULL", self.sql))
        }
    }

    pub fn in_list<T: DbEnum>(&self, values: &[T]) -> Leaf {
        in_list_leaf(
            &self.sql,
            values.iter().map(|v| Value::from(v.as_db_str())),
            &format!("::{}", self.type_name),
        )
    }

    pub fn not_in_list<T: DbEnum>(&self, values: &[T]) -> Leaf {
        not_in_list_leaf(
            &self.sql,
            values.iter().map(|v| Value::from(v.as_db_str())),
            &format!("::{}", self.type_name),
        )
    }
}

/// Capability-typed accessor into a JSONB document column. Path segments
/// are restricted to identifier characters; anything else is dropped so
/// user input can never escape the path literal.
#[derive(Debug, Clone)]
pub struct JsonPath {
    root: String,
    segments: Vec<String>,
}

impl JsonPath {
    pub fn of(alias: &str, column: &str) -> Self {
        Self { root: quoted(alias, column), segments: vec![] }
    }

    /// Descend by a dot-addressed key ("capacity.phones").
    pub fn get(&self, key: &str) -> Self {
        let mut next = self.clone();
        for segment in key.split('.') {
            let clean: String = segment
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            if !clean.is_empty() {
                next.segments.push(clean);
            }
        }
        next
    }

    fn path_literal(&self) -> String {
        format!("'{{{}}}'", self.segments.join(","))
    }

    /// The extracted node as jsonb.
    fn json_sql(&self) -> String {
        if self.segments.is_empty() {
            self.root.clone()
        } else {
            format!("{} #> {}", self.root, self.path_literal())
        }
    }

    /// The extracted node as text.
    fn text_sql(&self) -> String {
        if self.segments.is_empty() {
            format!("({})::text", self.root)
        } else {
            format!("{} #>> {}", self.root, self.path_literal())
        }
    }

    pub fn as_text(&self) -> TextPath {
        TextPath(format!("({})", self.text_sql()))
    }

    pub fn as_int(&self) -> NumberPath {
        NumberPath(format!("({})::bigint", self.text_sql()))
    }

    pub fn as_long(&self) -> NumberPath {
        self.as_int()
    }

    pub fn as_bool(&self) -> BoolPath {
        BoolPath(format!("({})::boolean", self.text_sql()))
    }

    /// Array length of the extracted node.
    pub fn length(&self) -> NumberPath {
        NumberPath(format!("jsonb_array_length({})", self.json_sql()))
    }

    /// JSONB containment of the given values.
    pub fn contains(&self, values: &[Value]) -> Leaf {
        Leaf::new(
            format!("{} @> (?)::jsonb", self.json_sql()),
            vec![Value::Array(values.to_vec())],
        )
    }
}

fn in_list_leaf(target: &str, values: impl Iterator<Item = Value>, cast: &str) -> Leaf {
    let params: Vec<Value> = values.collect();
    if params.is_empty() {
        // IN over an empty collection matches nothing
        return Leaf::fixed("1=0");
    }
    let placeholders: Vec<String> = params
        .iter()
        .map(|_| if cast.is_empty() { "?".to_string() } else { format!("(?){}", cast) })
        .collect();
    Leaf::new(format!("{} IN ({})", target, placeholders.join(", ")), params)
}

fn not_in_list_leaf(target: &str, values: impl Iterator<Item = Value>, cast: &str) -> Leaf {
    let params: Vec<Value> = values.collect();
    if params.is_empty() {
        // NOT IN over an empty collection excludes nothing
        return Leaf::fixed("1=1");
    }
    let placeholders: Vec<String> = params
        .iter()
        .map(|_| if cast.is_empty() { "?".to_string() } else { format!("(?){}", cast) })
        .collect();
    Leaf::new(format!("{} NOT IN ({})", target, placeholders.join(", ")), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[test]
    fn contains_builds_ilike_pattern() {
        let leaf = TextPath::col("d", "name").contains("foo");
        assert_eq!(leaf.sql, "d.\"name\" ILIKE ?");
        assert_eq!(leaf.params, vec![json!("%foo%")]);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let leaf = TextPath::col("d", "name").in_list(&[]);
        assert_eq!(leaf.sql, "1=0");
    }

    #[test]
    fn empty_not_in_list_matches_everything() {
        let leaf = TextPath::col("d", "name").not_in_list(&[]);
        assert_eq!(leaf.sql, "1=1");
    }

    #[test]
    fn json_path_descends_dot_addressed_keys() {
        let path = JsonPath::of("v", "attributes").get("capacity.phones");
        let leaf = path.as_int().cmp(">", json!(0));
        assert_eq!(leaf.sql, "(v.\"attributes\" #>> '{capacity,phones}')::bigint > ?");
    }

    #[test]
    fn json_path_strips_unsafe_characters() {
        let path = JsonPath::of("k", "attributes").get("no'tes}x");
        let leaf = path.as_text().eq("a");
        assert_eq!(leaf.sql, "(k.\"attributes\" #>> '{notesx}') = ?");
    }

    #[test]
    fn json_length_uses_array_length() {
        let path = JsonPath::of("k", "attributes").get("status");
        let leaf = path.length().cmp("=", json!(2));
        assert_eq!(leaf.sql, "jsonb_array_length(k.\"attributes\" #> '{status}') = ?");
    }

    #[test]
    fn json_contains_binds_jsonb_array() {
        let path = JsonPath::of("k", "attributes").get("status");
        let leaf = path.contains(&[json!("READY")]);
        assert_eq!(leaf.sql, "k.\"attributes\" #> '{status}' @> (?)::jsonb");
        assert_eq!(leaf.params, vec![json!(["READY"])]);
    }

    #[test]
    fn text_cast_to_number_wraps_expression() {
        let leaf = TextPath::col("k", "model").cast_to_number().cmp(">", json!(5));
        assert_eq!(leaf.sql, "(k.\"model\")::bigint > ?");
    }
}
