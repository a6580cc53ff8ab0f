use axum::extract::Path;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Caller, MaybeCaller};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::filter::inputs::DonorWhereInput;
use crate::filter::Page;
use crate::handlers::{QueryRequest, SearchRequest, WhereRequest};
use crate::models::{Coordinates, Donor};
use crate::repository::{DonorInput, DonorRepository};
use crate::services::LOCATOR;
use crate::visibility::{row_filter, EntityKind};

const READ: &[&str] = &["admin:donors", "read:donors", "read:donors:assigned"];

fn scoped(caller: &Caller, filter: &Option<DonorWhereInput>) -> BooleanBuilder {
    let mut builder = row_filter(EntityKind::Donors, caller, "d");
    if let Some(input) = filter {
        builder.and(input.build("d"));
    }
    builder
}

pub async fn search(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<SearchRequest<DonorWhereInput>>,
) -> Result<Json<Page<Donor>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(DonorRepository::reader().find_page(&pool, &filter, &body.page).await?))
}

pub async fn query(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<QueryRequest<DonorWhereInput>>,
) -> Result<Json<Vec<Donor>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(DonorRepository::reader().find_all(&pool, &filter, &body.order_by).await?))
}

pub async fn one(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<WhereRequest<DonorWhereInput>>,
) -> Result<Json<Donor>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(DonorRepository::reader().find_404(&pool, &filter).await?))
}

pub async fn create(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<DonorInput>,
) -> Result<Json<Donor>, ApiError> {
    caller.require("write:donors")?;
    let pool = DatabaseManager::pool().await?;

    let mut input = body;
    if !input.post_code.trim().is_empty() {
        input.coordinates = LOCATOR.resolve(&input.post_code).await;
    }
    let mut tx = pool.begin().await?;
    let donor = DonorRepository::fetch_or_merge(&mut tx, input).await?;
    tx.commit().await?;
    Ok(Json(donor))
}

#[derive(Debug, Deserialize)]
pub struct DonorUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub donor: DonorInput,
}

pub async fn update(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<DonorUpdateRequest>,
) -> Result<Json<Donor>, ApiError> {
    caller.require("write:donors")?;
    let pool = DatabaseManager::pool().await?;

    let mut visible = row_filter(EntityKind::Donors, &caller, "d");
    visible.and_leaf(Leaf::new("d.\"id\" = ?", vec![body.id.into()]));
    let existing = DonorRepository::reader().find_404(&pool, &visible).await?;

    let mut input = body.donor;
    input.coordinates = refreshed_coordinates(&existing, &input.post_code).await;

    let mut tx = pool.begin().await?;
    let donor = DonorRepository::update(&mut tx, body.id, &input).await?;
    tx.commit().await?;
    Ok(Json(donor))
}

async fn refreshed_coordinates(existing: &Donor, post_code: &str) -> Option<Coordinates> {
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
    caller.require("delete:donors")?;
    let pool = DatabaseManager::pool().await?;
    let mut conn = pool.acquire().await?;
    if !DonorRepository::delete(&mut conn, id).await? {
        return Err(ApiError::not_found(format!("Donor {} not found", id)));
    }
    Ok(Json(json!({ "deleted": true })))
}
