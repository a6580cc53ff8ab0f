//! HTTP surface. One module per entity plus the public intake
//! endpoints. Every collection handler follows the same shape:
//! permission check, visibility predicate, optional where-input,
//! repository call.

pub mod content;
pub mod donors;
pub mod email_templates;
pub mod kits;
pub mod notify;
pub mod organisations;
pub mod public;
pub mod volunteers;

use serde::Deserialize;

use crate::filter::{KeyValuePair, PaginationInput};

/// Body of a paged search: an optional where-input plus pagination.
#[derive(Debug, Deserialize)]
pub struct SearchRequest<W> {
    #[serde(rename = "where")]
    pub filter: Option<W>,
    #[serde(default)]
    pub page: PaginationInput,
}

/// Body of an unpaged query: an optional where-input plus sort order.
#[derive(Debug, Deserialize)]
pub struct QueryRequest<W> {
    #[serde(rename = "where")]
    pub filter: Option<W>,
    #[serde(default, rename = "orderBy")]
    pub order_by: Vec<KeyValuePair>,
}

/// Body of a single-row lookup by predicate.
#[derive(Debug, Deserialize)]
pub struct WhereRequest<W> {
    #[serde(rename = "where")]
    pub filter: Option<W>,
}
