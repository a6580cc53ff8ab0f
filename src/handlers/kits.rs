use axum::extract::Path;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Caller, MaybeCaller};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::filter::inputs::KitWhereInput;
use crate::filter::Page;
use crate::handlers::notify;
use crate::handlers::{QueryRequest, SearchRequest, WhereRequest};
use crate::models::{Coordinates, Kit, KitVolunteerRole, Volunteer};
use crate::repository::{
    DonorRepository, KitInput, KitRepository, KitStatusCount, KitTypeCount,
    OrganisationRepository, VolunteerRepository,
};
use crate::services::{LOCATOR, MAILER};
use crate::visibility::{row_filter, EntityKind};

const READ: &[&str] = &["admin:kits", "read:kits", "read:kits:assigned"];

fn scoped(caller: &Caller, filter: &Option<KitWhereInput>) -> BooleanBuilder {
    let mut builder = row_filter(EntityKind::Kits, caller, "k");
    if let Some(input) = filter {
        builder.and(input.build("k"));
    }
    builder
}

pub async fn search(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<SearchRequest<KitWhereInput>>,
) -> Result<Json<Page<Kit>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(KitRepository::reader().find_page(&pool, &filter, &body.page).await?))
}

pub async fn query(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<QueryRequest<KitWhereInput>>,
) -> Result<Json<Vec<Kit>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(KitRepository::reader().find_all(&pool, &filter, &body.order_by).await?))
}

pub async fn one(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<WhereRequest<KitWhereInput>>,
) -> Result<Json<Kit>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(KitRepository::reader().find_404(&pool, &filter).await?))
}

pub async fn status_stats(
    MaybeCaller(caller): MaybeCaller,
) -> Result<Json<Vec<KitStatusCount>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    Ok(Json(KitRepository::status_count(&pool).await?))
}

pub async fn type_stats(
    MaybeCaller(caller): MaybeCaller,
) -> Result<Json<Vec<KitTypeCount>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    Ok(Json(KitRepository::type_count(&pool).await?))
}

pub async fn create(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<KitInput>,
) -> Result<Json<Kit>, ApiError> {
    caller.require("write:kits")?;
    let pool = DatabaseManager::pool().await?;

    let mut input = body;
    if !input.location.trim().is_empty() {
        input.coordinates = LOCATOR.resolve(&input.location).await;
    }
    // The creating volunteer becomes the organiser when their login
    // email matches a volunteer record.
    let organiser = if caller.email.is_empty() {
        None
    } else {
        VolunteerRepository::find_by_email(&pool, &caller.email).await?
    };

    let mut tx = pool.begin().await?;
    let kit = KitRepository::insert(&mut tx, &input).await?;
    if let Some(volunteer) = &organiser {
        KitRepository::replace_role_assignments(
            &mut tx,
            kit.id,
            KitVolunteerRole::Organiser,
            &[volunteer.id],
        )
        .await?;
    }
    tx.commit().await?;
    Ok(Json(kit))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub kit: KitInput,
    pub organiser_ids: Option<Vec<i64>>,
    pub logistic_ids: Option<Vec<i64>>,
    pub technician_ids: Option<Vec<i64>>,
}

pub async fn update(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<KitUpdateRequest>,
) -> Result<Json<Kit>, ApiError> {
    caller.require("write:kits")?;
    let pool = DatabaseManager::pool().await?;

    // Writers only reach rows their read grant exposes.
    let mut visible = row_filter(EntityKind::Kits, &caller, "k");
    visible.and_leaf(Leaf::new("k.\"id\" = ?", vec![body.id.into()]));
    let existing = KitRepository::reader().find_404(&pool, &visible).await?;

    let mut input = body.kit;
    input.coordinates = refreshed_coordinates(&existing, &input.location).await;

    if let Some(donor_id) = input.donor_id {
        if existing.donor_id != Some(donor_id) {
            DonorRepository::by_id(&pool, donor_id).await?;
        }
    }
    if let Some(organisation_id) = input.organisation_id {
        if existing.organisation_id != Some(organisation_id) {
            OrganisationRepository::by_id(&pool, organisation_id).await?;
        }
    }

    let mut tx = pool.begin().await?;
    let kit = KitRepository::update(&mut tx, body.id, &input).await?;

    let roles = [
        (KitVolunteerRole::Organiser, body.organiser_ids),
        (KitVolunteerRole::Logistics, body.logistic_ids),
        (KitVolunteerRole::Technician, body.technician_ids),
    ];
    let mut newly_assigned: Vec<(KitVolunteerRole, Vec<i64>)> = Vec::new();
    for (role, ids) in roles {
        let ids = ids.unwrap_or_default();
        let added = KitRepository::replace_role_assignments(&mut tx, kit.id, role, &ids).await?;
        if !added.is_empty() {
            newly_assigned.push((role, added));
        }
    }
    let assigned = KitRepository::assigned_volunteers(&mut tx, kit.id).await?;
    tx.commit().await?;

    if existing.status != kit.status {
        notify::notify_status_updated(&*MAILER, &caller, &assigned, &kit, existing.status).await;
    }
    for (role, ids) in newly_assigned {
        let recipients: Vec<Volunteer> =
            assigned.iter().filter(|v| ids.contains(&v.id)).cloned().collect();
        notify::notify_assigned(&*MAILER, &caller, &recipients, &kit, role).await;
    }
    Ok(Json(kit))
}

/// Re-geocode only when the location text actually changed; a blank
/// location clears any stored coordinates.
async fn refreshed_coordinates(existing: &Kit, location: &str) -> Option<Coordinates> {
    if location.trim().is_empty() {
        return None;
    }
    match existing.coordinates.as_ref() {
        Some(coords) if coords.0.input == location => Some(coords.0.clone()),
        _ => LOCATOR.resolve(location).await,
    }
}

pub async fn delete(
    MaybeCaller(caller): MaybeCaller,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    caller.require("delete:kits")?;
    let pool = DatabaseManager::pool().await?;
    let mut conn = pool.acquire().await?;
    if !KitRepository::delete(&mut conn, id).await? {
        return Err(ApiError::not_found(format!("Kit {} not found", id)));
    }
    Ok(Json(json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KitType;
    use serde_json::json;

    #[test]
    fn update_request_flattens_kit_fields() {
        let body: KitUpdateRequest = serde_json::from_value(json!({
            "id": 5,
            "type": "LAPTOP",
            "status": "READY",
            "model": "XPS 13",
            "location": "SW9",
            "age": 2,
            "archived": false,
            "organiserIds": [1, 2],
        }))
        .unwrap();
        assert_eq!(body.id, 5);
        assert_eq!(body.kit.kit_type, KitType::Laptop);
        assert_eq!(body.kit.model, "XPS 13");
        assert_eq!(body.organiser_ids, Some(vec![1, 2]));
        assert_eq!(body.technician_ids, None);
    }
}
