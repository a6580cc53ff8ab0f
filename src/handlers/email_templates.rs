use axum::extract::Path;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Caller, MaybeCaller};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::filter::expr::BooleanBuilder;
use crate::filter::inputs::EmailTemplateWhereInput;
use crate::filter::Page;
use crate::handlers::{QueryRequest, SearchRequest, WhereRequest};
use crate::models::EmailTemplate;
use crate::repository::{EmailTemplateInput, EmailTemplateRepository};
use crate::visibility::{row_filter, EntityKind};

const READ: &[&str] = &["admin:emails", "read:emails"];

fn scoped(caller: &Caller, filter: &Option<EmailTemplateWhereInput>) -> BooleanBuilder {
    let mut builder = row_filter(EntityKind::Emails, caller, "e");
    if let Some(input) = filter {
        builder.and(input.build("e"));
    }
    builder
}

pub async fn search(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<SearchRequest<EmailTemplateWhereInput>>,
) -> Result<Json<Page<EmailTemplate>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(EmailTemplateRepository::reader().find_page(&pool, &filter, &body.page).await?))
}

pub async fn query(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<QueryRequest<EmailTemplateWhereInput>>,
) -> Result<Json<Vec<EmailTemplate>>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(EmailTemplateRepository::reader().find_all(&pool, &filter, &body.order_by).await?))
}

pub async fn one(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<WhereRequest<EmailTemplateWhereInput>>,
) -> Result<Json<EmailTemplate>, ApiError> {
    caller.require_any(READ)?;
    let pool = DatabaseManager::pool().await?;
    let filter = scoped(&caller, &body.filter);
    Ok(Json(EmailTemplateRepository::reader().find_404(&pool, &filter).await?))
}

pub async fn create(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<EmailTemplateInput>,
) -> Result<Json<EmailTemplate>, ApiError> {
    caller.require("write:emails")?;
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;
    let template = EmailTemplateRepository::insert(&mut tx, &body).await?;
    tx.commit().await?;
    Ok(Json(template))
}

#[derive(Debug, Deserialize)]
pub struct EmailTemplateUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub template: EmailTemplateInput,
}

pub async fn update(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<EmailTemplateUpdateRequest>,
) -> Result<Json<EmailTemplate>, ApiError> {
    caller.require("write:emails")?;
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;
    let template = EmailTemplateRepository::update(&mut tx, body.id, &body.template).await?;
    tx.commit().await?;
    Ok(Json(template))
}

pub async fn delete(
    MaybeCaller(caller): MaybeCaller,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    caller.require("delete:emails")?;
    let pool = DatabaseManager::pool().await?;
    let mut conn = pool.acquire().await?;
    if !EmailTemplateRepository::delete(&mut conn, id).await? {
        return Err(ApiError::not_found(format!("Email template {} not found", id)));
    }
    Ok(Json(json!({ "deleted": true })))
}
