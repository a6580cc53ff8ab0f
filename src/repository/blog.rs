use serde::Deserialize;
use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::models::{Faq, Post};

const POST_SELECT: &str =
    "p.id, p.title, p.slug, p.published, p.secured, p.content, p.created_at, p.updated_at";
const FAQ_SELECT: &str =
    "f.id, f.title, f.content, f.published, f.position, f.created_at, f.updated_at";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostInput {
    pub title: String,
    pub slug: String,
    pub published: bool,
    pub secured: bool,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaqInput {
    pub title: String,
    pub content: String,
    pub published: bool,
    pub position: i32,
}

pub struct PostRepository;

impl PostRepository {
    pub fn reader() -> Repository<Post> {
        Repository::new("posts", "p", POST_SELECT)
    }

    pub async fn by_id(pool: &PgPool, id: i64) -> Result<Post, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("p.\"id\" = ?", vec![id.into()]));
        Self::reader().find_404(pool, &filter).await
    }

    pub async fn fetch_by_id(conn: &mut PgConnection, id: i64) -> Result<Post, DatabaseError> {
        let query = format!("SELECT {} FROM posts p WHERE p.id = $1", POST_SELECT);
        Ok(sqlx::query_as::<_, Post>(&query).bind(id).fetch_one(conn).await?)
    }

    pub async fn insert(conn: &mut PgConnection, input: &PostInput) -> Result<Post, DatabaseError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (title, slug, published, secured, content) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(input.published)
        .bind(input.secured)
        .bind(&input.content)
        .fetch_one(&mut *conn)
        .await?;
        Self::fetch_by_id(conn, id).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        input: &PostInput,
    ) -> Result<Post, DatabaseError> {
        let updated = sqlx::query(
            "UPDATE posts SET title = $1, slug = $2, published = $3, secured = $4, content = $5, \
             updated_at = NOW() WHERE id = $6",
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(input.published)
        .bind(input.secured)
        .bind(&input.content)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Post {} not found", id)));
        }
        Self::fetch_by_id(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1").bind(id).execute(conn).await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct FaqRepository;

impl FaqRepository {
    pub fn reader() -> Repository<Faq> {
        Repository::new("faqs", "f", FAQ_SELECT)
    }

    pub async fn by_id(pool: &PgPool, id: i64) -> Result<Faq, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("f.\"id\" = ?", vec![id.into()]));
        Self::reader().find_404(pool, &filter).await
    }

    pub async fn fetch_by_id(conn: &mut PgConnection, id: i64) -> Result<Faq, DatabaseError> {
        let query = format!("SELECT {} FROM faqs f WHERE f.id = $1", FAQ_SELECT);
        Ok(sqlx::query_as::<_, Faq>(&query).bind(id).fetch_one(conn).await?)
    }

    pub async fn insert(conn: &mut PgConnection, input: &FaqInput) -> Result<Faq, DatabaseError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO faqs (title, content, published, position) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.published)
        .bind(input.position)
        .fetch_one(&mut *conn)
        .await?;
        Self::fetch_by_id(conn, id).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        input: &FaqInput,
    ) -> Result<Faq, DatabaseError> {
        let updated = sqlx::query(
            "UPDATE faqs SET title = $1, content = $2, published = $3, position = $4, \
             updated_at = NOW() WHERE id = $5",
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.published)
        .bind(input.position)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Faq {} not found", id)));
        }
        Self::fetch_by_id(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = $1").bind(id).execute(conn).await?;
        Ok(result.rows_affected() > 0)
    }
}
