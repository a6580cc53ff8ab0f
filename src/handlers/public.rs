//! Unauthenticated intake: the donation form, volunteer sign-up, a
//! geocoding passthrough for the frontend, and the health probe.

use axum::extract::Query;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::models::{Coordinates, Donor, Kit};
use crate::repository::{DonorInput, DonorRepository, KitInput, KitRepository, VolunteerInput, VolunteerRepository};
use crate::services::LOCATOR;

#[derive(Debug, Deserialize)]
pub struct DonateRequest {
    pub donor: DonorInput,
    #[serde(default)]
    pub kits: Vec<KitInput>,
}

#[derive(Debug, Serialize)]
pub struct DonatePayload {
    pub donor: Donor,
    pub kits: Vec<Kit>,
}

/// One submission from the donation form: the donor's details plus the
/// devices they are offering. Repeat donors are matched on email or
/// phone and merged rather than duplicated.
pub async fn donate(Json(body): Json<DonateRequest>) -> Result<Json<DonatePayload>, ApiError> {
    if body.kits.is_empty() {
        return Err(ApiError::validation_error("kits cannot be empty", None));
    }
    let pool = DatabaseManager::pool().await?;

    let mut donor_input = body.donor;
    if !donor_input.post_code.trim().is_empty() {
        donor_input.coordinates = LOCATOR.resolve(&donor_input.post_code).await;
    }
    let mut kit_inputs = body.kits;
    for kit in kit_inputs.iter_mut() {
        if !kit.location.trim().is_empty() {
            kit.coordinates = LOCATOR.resolve(&kit.location).await;
        }
    }

    let mut tx = pool.begin().await?;
    let donor = DonorRepository::fetch_or_merge(&mut tx, donor_input).await?;
    let mut kits = Vec::with_capacity(kit_inputs.len());
    for mut kit in kit_inputs {
        kit.donor_id = Some(donor.id);
        kits.push(KitRepository::insert(&mut tx, &kit).await?);
    }
    tx.commit().await?;

    Ok(Json(DonatePayload { donor, kits }))
}

/// Public volunteer sign-up. Email addresses are unique across
/// volunteers; a repeat application is rejected rather than merged.
pub async fn apply(Json(body): Json<VolunteerInput>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    if !body.email.trim().is_empty()
        && VolunteerRepository::find_by_email(&pool, &body.email).await?.is_some()
    {
        return Err(ApiError::conflict(format!(
            "A volunteer with the email address {} already exists",
            body.email
        )));
    }

    let mut input = body;
    if !input.post_code.trim().is_empty() {
        input.coordinates = LOCATOR.resolve(&input.post_code).await;
    }
    let mut tx = pool.begin().await?;
    let volunteer = VolunteerRepository::insert(&mut tx, &input).await?;
    tx.commit().await?;
    Ok(Json(json!(volunteer)))
}

#[derive(Debug, Deserialize)]
pub struct LocationLookup {
    pub address: String,
}

pub async fn locations(
    Query(lookup): Query<LocationLookup>,
) -> Result<Json<Coordinates>, ApiError> {
    match LOCATOR.resolve(&lookup.address).await {
        Some(coordinates) => Ok(Json(coordinates)),
        None => Err(ApiError::not_found(format!("No match for address: {}", lookup.address))),
    }
}

pub async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
