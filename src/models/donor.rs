use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::coordinates::Coordinates;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: i64,
    pub post_code: String,
    pub phone_number: String,
    pub email: String,
    pub name: String,
    pub referral: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Count of linked kits, computed per query.
    pub kit_count: i64,
    pub coordinates: Option<Json<Coordinates>>,
}
