use axum::extract::Path;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Caller, MaybeCaller};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::filter::expr::BooleanBuilder;
use crate::filter::inputs::OrganisationWhereInput;
use crate::filter::Page;
use crate::handlers::notify;
use crate::handlers::{QueryRequest, SearchRequest, WhereRequest};
use crate::models::Organisation;
use crate::repository::{OrganisationInput, OrganisationRepository, RequestCount, VolunteerRepository};
use crate::services::MAILER;
use crate::visibility::{row_filter, EntityKind};

const READ: &[&str] = &["admin:organisations", "read:organisations", "read:organisations:assigned"];

fn scoped(caller: &Caller, filter: &Option<OrganisationWhereInput>) -> BooleanBuilder {
    let mut builder = row_filter(EntityKind::Organisations, caller, "o");
    if let Some(input) = filter {
        builder.and(input.build("o"));
    }
    builder
}

pub async fn search(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<SearchRequest<OrganisationWhereInput>>,
) -> Result<Json<Page<Organisation>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(OrganisationRepository::reader().find_page(&pool, &filter, &body.page).await?))
}

pub async fn query(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<QueryRequest<OrganisationWhereInput>>,
) -> Result<Json<Vec<Organisation>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(OrganisationRepository::reader().find_all(&pool, &filter, &body.order_by).await?))
}

pub async fn one(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<WhereRequest<OrganisationWhereInput>>,
) -> Result<Json<Organisation>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(OrganisationRepository::reader().find_404(&pool, &filter).await?))
}

pub async fn request_stats(
    MaybeCaller(caller): MaybeCaller,
) -> Result<Json<RequestCount>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    Ok(Json(OrganisationRepository::request_count(&pool).await?))
}

pub async fn create(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<OrganisationInput>,
) -> Result<Json<Organisation>, ApiError> {
    caller.require("write:organisations")?;
    let pool = DatabaseManager::pool().await?;

    if let Some(volunteer_id) = body.volunteer_id {
        VolunteerRepository::by_id(&pool, volunteer_id).await?;
    }
    let mut tx = pool.begin().await?;
    let organisation = OrganisationRepository::insert(&mut tx, &body).await?;
    tx.commit().await?;
    Ok(Json(organisation))
}

#[derive(Debug, Deserialize)]
pub struct OrganisationUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub organisation: OrganisationInput,
}

pub async fn update(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<OrganisationUpdateRequest>,
) -> Result<Json<Organisation>, ApiError> {
    caller.require("write:organisations")?;
    let pool = DatabaseManager::pool().await?;

    let existing = OrganisationRepository::by_id(&pool, body.id).await?;

    // A newly attached owner is validated up front and notified after
    // the row is committed.
    let new_owner = match body.organisation.volunteer_id {
        Some(volunteer_id) if existing.volunteer_id != Some(volunteer_id) => {
            Some(VolunteerRepository::by_id(&pool, volunteer_id).await?)
        }
        _ => None,
    };

    let mut tx = pool.begin().await?;
    let organisation = OrganisationRepository::update(&mut tx, body.id, &body.organisation).await?;
    tx.commit().await?;

    if let Some(owner) = new_owner {
        notify::notify_organisation_assigned(&*MAILER, &caller, &owner, &organisation).await;
    }
    Ok(Json(organisation))
}

pub async fn delete(
    MaybeCaller(caller): MaybeCaller,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    caller.require("delete:organisations")?;
    let pool = DatabaseManager::pool().await?;
    let mut conn = pool.acquire().await?;
    if !OrganisationRepository::delete(&mut conn, id).await? {
        return Err(ApiError::not_found(format!("Organisation {} not found", id)));
    }
    Ok(Json(json!({ "deleted": true })))
}
