use axum::extract::Path;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Caller, MaybeCaller};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::filter::inputs::VolunteerWhereInput;
use crate::filter::Page;
use crate::handlers::{QueryRequest, SearchRequest, WhereRequest};
use crate::models::{Coordinates, Volunteer};
use crate::repository::{VolunteerInput, VolunteerRepository};
use crate::services::LOCATOR;
use crate::visibility::{row_filter, EntityKind};

const READ: &[&str] = &["admin:volunteers", "read:volunteers", "read:volunteers:assigned"];

fn scoped(caller: &Caller, filter: &Option<VolunteerWhereInput>) -> BooleanBuilder {
    let mut builder = row_filter(EntityKind::Volunteers, caller, "v");
    if let Some(input) = filter {
        builder.and(input.build("v"));
    }
    builder
}

pub async fn search(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<SearchRequest<VolunteerWhereInput>>,
) -> Result<Json<Page<Volunteer>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(VolunteerRepository::reader().find_page(&pool, &filter, &body.page).await?))
}

pub async fn query(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<QueryRequest<VolunteerWhereInput>>,
) -> Result<Json<Vec<Volunteer>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(VolunteerRepository::reader().find_all(&pool, &filter, &body.order_by).await?))
}

pub async fn one(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<WhereRequest<VolunteerWhereInput>>,
) -> Result<Json<Volunteer>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(VolunteerRepository::reader().find_404(&pool, &filter).await?))
}

#[derive(Debug, Deserialize)]
pub struct VolunteerUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub volunteer: VolunteerInput,
}

pub async fn update(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<VolunteerUpdateRequest>,
) -> Result<Json<Volunteer>, ApiError> {
    caller.require("write:volunteers")?;
    let pool = DatabaseManager::pool().await?;

    let mut visible = row_filter(EntityKind::Volunteers, &caller, "v");
    visible.and_leaf(Leaf::new("v.\"id\" = ?", vec![body.id.into()]));
    let existing = VolunteerRepository::reader().find_404(&pool, &visible).await?;

    // An assigned-level caller is editing their own record and must not
    // detach it from their login by changing the email.
    if caller.has_permission("read:volunteers:assigned")
        && existing.email != body.volunteer.email
    {
        return Err(ApiError::validation_error(
            format!("Unable to update the email address to {}", body.volunteer.email),
            None,
        ));
    }

    let mut input = body.volunteer;
    input.coordinates = refreshed_coordinates(&existing, &input.post_code).await;

    let mut tx = pool.begin().await?;
    let volunteer = VolunteerRepository::update(&mut tx, body.id, &input).await?;
    tx.commit().await?;
    Ok(Json(volunteer))
}

async fn refreshed_coordinates(existing: &Volunteer, post_code: &str) -> Option<Coordinates> {
    if post_code.trim().is_empty() {
        return None;
    }
    match existing.coordinates.as_ref() {
        Some(coords) if coords.0.input == post_code => Some(coords.0.clone()),
        _ => LOCATOR.resolve(post_code).await,
    }
}

pub async fn delete(
    MaybeCaller(caller): MaybeCaller,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    caller.require("delete:volunteers")?;
    let pool = DatabaseManager::pool().await?;

    let mut visible = row_filter(EntityKind::Volunteers, &caller, "v");
    visible.and_leaf(Leaf::new("v.\"id\" = ?", vec![id.into()]));
    VolunteerRepository::reader().find_404(&pool, &visible).await?;

    let mut conn = pool.acquire().await?;
    VolunteerRepository::delete(&mut conn, id).await?;
    Ok(Json(json!({ "deleted": true })))
}
