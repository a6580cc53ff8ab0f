use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::models::{Coordinates, Volunteer, VolunteerAttributes};

const SELECT: &str = "v.id, v.name, v.phone_number, v.email, v.expertise, v.sub_group, \
     v.storage, v.transport, v.post_code, v.availability, v.consent, \
     v.created_at, v.updated_at, \
     (SELECT COUNT(*) FROM kit_volunteers kv WHERE kv.volunteer_id = v.id) AS kit_count, \
     v.coordinates, v.attributes";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerInput {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub expertise: String,
    pub sub_group: String,
    pub storage: String,
    pub transport: String,
    pub post_code: String,
    pub availability: String,
    pub consent: String,
    pub attributes: Option<VolunteerAttributes>,
    #[serde(skip)]
    pub coordinates: Option<Coordinates>,
}

pub struct VolunteerRepository;

impl VolunteerRepository {
    pub fn reader() -> Repository<Volunteer> {
        Repository::new("volunteers", "v", SELECT)
    }

    pub async fn by_id(pool: &PgPool, id: i64) -> Result<Volunteer, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("v.\"id\" = ?", vec![id.into()]));
        Self::reader().find_404(pool, &filter).await
    }

    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Volunteer>, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("v.\"email\" = ?", vec![email.into()]));
        Self::reader().find_one(pool, &filter).await
    }

    pub async fn fetch_by_id(conn: &mut PgConnection, id: i64) -> Result<Volunteer, DatabaseError> {
        let query = format!("SELECT {} FROM volunteers v WHERE v.id = $1", SELECT);
        Ok(sqlx::query_as::<_, Volunteer>(&query).bind(id).fetch_one(conn).await?)
    }

    pub async fn insert(
        conn: &mut PgConnection,
        input: &VolunteerInput,
    ) -> Result<Volunteer, DatabaseError> {
        let attributes = input.attributes.clone().unwrap_or_default();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO volunteers (name, phone_number, email, expertise, sub_group, storage, \
             transport, post_code, availability, consent, coordinates, attributes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.expertise)
        .bind(&input.sub_group)
        .bind(&input.storage)
        .bind(&input.transport)
        .bind(&input.post_code)
        .bind(&input.availability)
        .bind(&input.consent)
        .bind(input.coordinates.as_ref().map(Json))
        .bind(Json(attributes))
        .fetch_one(&mut *conn)
        .await?;
        Self::fetch_by_id(conn, id).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        input: &VolunteerInput,
    ) -> Result<Volunteer, DatabaseError> {
        let attributes = input.attributes.clone().unwrap_or_default();
        let updated = sqlx::query(
            "UPDATE volunteers SET name = $1, phone_number = $2, email = $3, expertise = $4, \
             sub_group = $5, storage = $6, transport = $7, post_code = $8, availability = $9, \
             consent = $10, coordinates = $11, attributes = $12, updated_at = NOW() \
             WHERE id = $13",
        )
        .bind(&input.name)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.expertise)
        .bind(&input.sub_group)
        .bind(&input.storage)
        .bind(&input.transport)
        .bind(&input.post_code)
        .bind(&input.availability)
        .bind(&input.consent)
        .bind(input.coordinates.as_ref().map(Json))
        .bind(Json(attributes))
        .bind(id)
        .execute(&mut *conn)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Volunteer {} not found", id)));
        }
        Self::fetch_by_id(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM volunteers WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
