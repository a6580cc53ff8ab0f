//! Public site content: posts and FAQs. Reads are open, but posts
//! marked `secured` only surface for callers holding `read:content`.

use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Caller, MaybeCaller};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::filter::inputs::{FaqWhereInput, PostWhereInput};
use crate::filter::Page;
use crate::handlers::{QueryRequest, SearchRequest};
use crate::models::{Faq, Post};
use crate::repository::{FaqInput, FaqRepository, PostInput, PostRepository};

fn post_filter(caller: &Caller, filter: &Option<PostWhereInput>) -> BooleanBuilder {
    let mut builder = BooleanBuilder::new();
    if !caller.has_permission("read:content") {
        builder.and_leaf(Leaf::new("p.\"secured\" = ?", vec![false.into()]));
    }
    if let Some(input) = filter {
        builder.and(input.build("p"));
    }
    builder
}

pub async fn search_posts(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<SearchRequest<PostWhereInput>>,
) -> Result<Json<Page<Post>>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let filter = post_filter(&caller, &body.filter);
    Ok(Json(PostRepository::reader().find_page(&pool, &filter, &body.page).await?))
}

pub async fn query_posts(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<QueryRequest<PostWhereInput>>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let filter = post_filter(&caller, &body.filter);
    Ok(Json(PostRepository::reader().find_all(&pool, &filter, &body.order_by).await?))
}

#[derive(Debug, Deserialize)]
pub struct PostLookup {
    pub id: Option<i64>,
    pub slug: Option<String>,
}

pub async fn one_post(
    MaybeCaller(caller): MaybeCaller,
    Query(lookup): Query<PostLookup>,
) -> Result<Json<Post>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let mut filter = post_filter(&caller, &None);
    match (lookup.id, lookup.slug) {
        (Some(id), _) => {
            filter.and_leaf(Leaf::new("p.\"id\" = ?", vec![id.into()]));
        }
        (None, Some(slug)) => {
            filter.and_leaf(Leaf::new("p.\"slug\" = ?", vec![slug.into()]));
        }
        (None, None) => {
            return Err(ApiError::validation_error("Provide an id or a slug", None));
        }
    }
    Ok(Json(PostRepository::reader().find_404(&pool, &filter).await?))
}

pub async fn create_post(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<PostInput>,
) -> Result<Json<Post>, ApiError> {
    caller.require("write:content")?;
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;
    let post = PostRepository::insert(&mut tx, &body).await?;
    tx.commit().await?;
    Ok(Json(post))
}

#[derive(Debug, Deserialize)]
pub struct PostUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub post: PostInput,
}

pub async fn update_post(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<PostUpdateRequest>,
) -> Result<Json<Post>, ApiError> {
    caller.require("write:content")?;
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;
    let post = PostRepository::update(&mut tx, body.id, &body.post).await?;
    tx.commit().await?;
    Ok(Json(post))
}

pub async fn delete_post(
    MaybeCaller(caller): MaybeCaller,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    caller.require("delete:content")?;
    let pool = DatabaseManager::pool().await?;
    let mut conn = pool.acquire().await?;
    if !PostRepository::delete(&mut conn, id).await? {
        return Err(ApiError::not_found(format!("Post {} not found", id)));
    }
    Ok(Json(json!({ "deleted": true })))
}

pub async fn search_faqs(
    Json(body): Json<SearchRequest<FaqWhereInput>>,
) -> Result<Json<Page<Faq>>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let mut filter = BooleanBuilder::new();
    if let Some(input) = &body.filter {
        filter.and(input.build("f"));
    }
    Ok(Json(FaqRepository::reader().find_page(&pool, &filter, &body.page).await?))
}

pub async fn query_faqs(
    Json(body): Json<QueryRequest<FaqWhereInput>>,
) -> Result<Json<Vec<Faq>>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let mut filter = BooleanBuilder::new();
    if let Some(input) = &body.filter {
        filter.and(input.build("f"));
    }
    Ok(Json(FaqRepository::reader().find_all(&pool, &filter, &body.order_by).await?))
}

pub async fn create_faq(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<FaqInput>,
) -> Result<Json<Faq>, ApiError> {
    caller.require("write:content")?;
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;
    let faq = FaqRepository::insert(&mut tx, &body).await?;
    tx.commit().await?;
    Ok(Json(faq))
}

#[derive(Debug, Deserialize)]
pub struct FaqUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub faq: FaqInput,
}

pub async fn update_faq(
    MaybeCaller(caller): MaybeCaller,
    Json(body): Json<FaqUpdateRequest>,
) -> Result<Json<Faq>, ApiError> {
    caller.require("write:content")?;
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;
    let faq = FaqRepository::update(&mut tx, body.id, &body.faq).await?;
    tx.commit().await?;
    Ok(Json(faq))
}

pub async fn delete_faq(
    MaybeCaller(caller): MaybeCaller,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    caller.require("delete:content")?;
    let pool = DatabaseManager::pool().await?;
    let mut conn = pool.acquire().await?;
    if !FaqRepository::delete(&mut conn, id).await? {
        return Err(ApiError::not_found(format!("Faq {} not found", id)));
    }
    Ok(Json(json!({ "deleted": true })))
}
