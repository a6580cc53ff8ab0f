use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::coordinates::Coordinates;
use super::enums::{KitStatus, KitType, KitVolunteerRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Kit {
    pub id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kit_type: KitType,
    pub status: KitStatus,
    pub model: String,
    pub location: String,
    pub age: i32,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub attributes: Json<KitAttributes>,
    pub coordinates: Option<Json<Coordinates>>,
    pub donor_id: Option<i64>,
    pub organisation_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KitAttributes {
    pub images: Vec<KitImage>,
    pub other_type: Option<String>,
    pub pickup: String,
    pub state: String,
    pub consent: String,
    pub notes: String,
    pub pickup_availability: Option<String>,
    pub credentials: Option<String>,
    pub status: Vec<String>,
    pub network: Option<String>,
    pub other_network: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitImage {
    pub image: String,
    #[serde(default)]
    pub id: String,
}

/// Role assignment joining a kit to a volunteer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct KitVolunteer {
    pub kit_id: i64,
    pub volunteer_id: i64,
    pub role: KitVolunteerRole,
    pub created_at: DateTime<Utc>,
}
