use serde::Deserialize;
use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::models::EmailTemplate;

const SELECT: &str = "e.id, e.subject, e.body, e.active, e.created_at, e.updated_at";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailTemplateInput {
    pub subject: String,
    pub body: String,
    pub active: bool,
}

pub struct EmailTemplateRepository;

impl EmailTemplateRepository {
    pub fn reader() -> Repository<EmailTemplate> {
        Repository::new("email_templates", "e", SELECT)
    }

    pub async fn by_id(pool: &PgPool, id: i64) -> Result<EmailTemplate, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("e.\"id\" = ?", vec![id.into()]));
        Self::reader().find_404(pool, &filter).await
    }

    pub async fn fetch_by_id(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<EmailTemplate, DatabaseError> {
        let query = format!("SELECT {} FROM email_templates e WHERE e.id = $1", SELECT);
        Ok(sqlx::query_as::<_, EmailTemplate>(&query).bind(id).fetch_one(conn).await?)
    }

    pub async fn insert(
        conn: &mut PgConnection,
        input: &EmailTemplateInput,
    ) -> Result<EmailTemplate, DatabaseError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO email_templates (subject, body, active) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&input.subject)
        .bind(&input.body)
        .bind(input.active)
        .fetch_one(&mut *conn)
        .await?;
        Self::fetch_by_id(conn, id).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        input: &EmailTemplateInput,
    ) -> Result<EmailTemplate, DatabaseError> {
        let updated = sqlx::query(
            "UPDATE email_templates SET subject = $1, body = $2, active = $3, updated_at = NOW() \
             WHERE id = $4",
        )
        .bind(&input.subject)
        .bind(&input.body)
        .bind(input.active)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Email template {} not found", id)));
        }
        Self::fetch_by_id(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
