use serde::{Deserialize, Serialize};

/// A geocoded point. `input` is the free-text address that was resolved,
/// `address` the formatted address the resolver returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub input: String,
}
