use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// A sort instruction: `key` is the API-side field name, `value` the
/// direction ("ASC" or "DESC", case-insensitive).
#[derive(Debug, Clone, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

/// Zero-based page request with optional multi-column sort.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationInput {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
    #[serde(default)]
    pub sort: Vec<KeyValuePair>,
}

fn default_page_size() -> i64 {
    25
}

impl Default for PaginationInput {
    fn default() -> Self {
        Self { page: 0, size: default_page_size(), sort: vec![] }
    }
}

impl PaginationInput {
    /// Render `ORDER BY ... LIMIT ... OFFSET ...`. Sort keys arrive in
    /// camelCase and map onto snake_case columns; anything that is not a
    /// plain identifier is rejected rather than interpolated.
    pub fn to_sql(&self, alias: &str) -> Result<String, FilterError> {
        if self.size <= 0 || self.size > crate::config::config().server.max_page_size {
            return Err(FilterError::InvalidPageSize(self.size));
        }
        if self.page < 0 {
            return Err(FilterError::InvalidPageIndex(self.page));
        }

        let mut out = order_by_sql(alias, &self.sort)?;
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&format!("LIMIT {} OFFSET {}", self.size, self.page * self.size));
        Ok(out)
    }
}

/// Render an ORDER BY clause from API-side sort pairs. Empty input
/// renders nothing.
pub fn order_by_sql(alias: &str, sort: &[KeyValuePair]) -> Result<String, FilterError> {
    if sort.is_empty() {
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(sort.len());
    for pair in sort {
        let column = to_snake_case(&pair.key);
        if column.is_empty()
            || !column.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(FilterError::InvalidSortColumn(pair.key.clone()));
        }
        let direction = match pair.value.to_ascii_uppercase().as_str() {
            "ASC" => "ASC",
            "DESC" => "DESC",
            _ => return Err(FilterError::InvalidSortDirection(pair.value.clone())),
        };
        parts.push(format!("{}.\"{}\" {}", alias, column, direction));
    }
    Ok(format!("ORDER BY {}", parts.join(", ")))
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// One page of results plus the unpaginated match count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: i64,
    pub page: i64,
    pub size: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_elements: i64, request: &PaginationInput) -> Self {
        Self { items, total_elements, page: request.page, size: request.size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sort(key: &str, value: &str) -> KeyValuePair {
        KeyValuePair { key: key.into(), value: value.into() }
    }

    #[test]
    fn default_request_has_no_order_by() {
        let sql = PaginationInput::default().to_sql("k").unwrap();
        assert_eq!(sql, "LIMIT 25 OFFSET 0");
    }

    #[test]
    fn offset_scales_with_page() {
        let input = PaginationInput { page: 3, size: 10, sort: vec![] };
        assert_eq!(input.to_sql("k").unwrap(), "LIMIT 10 OFFSET 30");
    }

    #[test]
    fn camel_case_keys_map_to_snake_case_columns() {
        let input = PaginationInput { page: 0, size: 5, sort: vec![sort("createdAt", "desc")] };
        assert_eq!(input.to_sql("d").unwrap(), "ORDER BY d.\"created_at\" DESC LIMIT 5 OFFSET 0");
    }

    #[test]
    fn multiple_sort_keys_preserve_order() {
        let input = PaginationInput {
            page: 0,
            size: 5,
            sort: vec![sort("status", "ASC"), sort("updatedAt", "DESC")],
        };
        assert_eq!(
            input.to_sql("k").unwrap(),
            "ORDER BY k.\"status\" ASC, k.\"updated_at\" DESC LIMIT 5 OFFSET 0"
        );
    }

    #[test]
    fn rejects_non_identifier_sort_keys() {
        let input = PaginationInput { page: 0, size: 5, sort: vec![sort("id; DROP TABLE kits", "asc")] };
        assert!(matches!(input.to_sql("k"), Err(FilterError::InvalidSortColumn(_))));
    }

    #[test]
    fn rejects_unknown_directions() {
        let input = PaginationInput { page: 0, size: 5, sort: vec![sort("id", "sideways")] };
        assert!(matches!(input.to_sql("k"), Err(FilterError::InvalidSortDirection(_))));
    }

    #[test]
    fn rejects_non_positive_size() {
        let input = PaginationInput { page: 0, size: 0, sort: vec![] };
        assert!(matches!(input.to_sql("k"), Err(FilterError::InvalidPageSize(0))));
    }

    #[test]
    fn rejects_sizes_beyond_the_configured_cap() {
        let input = PaginationInput { page: 0, size: 1_000_000, sort: vec![] };
        assert!(matches!(input.to_sql("k"), Err(FilterError::InvalidPageSize(_))));
    }

    #[test]
    fn rejects_negative_page() {
        let input = PaginationInput { page: -1, size: 5, sort: vec![] };
        assert!(matches!(input.to_sql("k"), Err(FilterError::InvalidPageIndex(-1))));
    }
}
