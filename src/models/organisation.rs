use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::volunteer::Capacity;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub id: i64,
    pub name: String,
    pub website: String,
    pub contact: String,
    pub phone_number: String,
    pub email: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Count of linked kits, computed per query.
    pub kit_count: i64,
    pub attributes: Json<OrganisationAttributes>,
    /// Owning volunteer, when one has been assigned.
    pub volunteer_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganisationAttributes {
    pub request: Capacity,
    pub alternate_request: Capacity,
    pub accepts: Vec<String>,
    pub alternate_accepts: Vec<String>,
    pub notes: String,
}
