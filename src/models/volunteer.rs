use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::coordinates::Coordinates;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub expertise: String,
    pub sub_group: String,
    pub storage: String,
    pub transport: String,
    pub post_code: String,
    pub availability: String,
    pub consent: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Count of kit role assignments, computed per query.
    pub kit_count: i64,
    pub coordinates: Option<Json<Coordinates>>,
    pub attributes: Json<VolunteerAttributes>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerAttributes {
    pub drop_off_availability: String,
    pub has_capacity: bool,
    pub accepts: Vec<String>,
    pub capacity: Capacity,
}

/// Device counts a volunteer or organisation can take on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capacity {
    pub phones: i32,
    pub tablets: i32,
    pub laptops: i32,
    pub all_in_ones: i32,
    pub other: i32,
    pub chromebooks: Option<i32>,
}
