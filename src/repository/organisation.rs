use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::models::{Organisation, OrganisationAttributes};

const SELECT: &str = "o.id, o.name, o.website, o.contact, o.phone_number, o.email, o.archived, \
     o.created_at, o.updated_at, \
     (SELECT COUNT(*) FROM kits k WHERE k.organisation_id = o.id) AS kit_count, \
     o.attributes, o.volunteer_id";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganisationInput {
    pub name: String,
    pub website: String,
    pub contact: String,
    pub phone_number: String,
    pub email: String,
    pub archived: bool,
    pub attributes: Option<OrganisationAttributes>,
    pub volunteer_id: Option<i64>,
}

/// Device capacity requested across all active organisations, summing
/// primary and alternate requests straight out of the JSONB documents.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RequestCount {
    pub phones: i64,
    pub laptops: i64,
    pub tablets: i64,
    pub all_in_ones: i64,
    pub desktops: i64,
    pub other: i64,
    pub chromebooks: i64,
    pub comms_devices: i64,
}

pub struct OrganisationRepository;

impl OrganisationRepository {
    pub fn reader() -> Repository<Organisation> {
        Repository::new("organisations", "o", SELECT)
    }

    pub async fn by_id(pool: &PgPool, id: i64) -> Result<Organisation, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("o.\"id\" = ?", vec![id.into()]));
        Self::reader().find_404(pool, &filter).await
    }

    pub async fn fetch_by_id(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Organisation, DatabaseError> {
        let query = format!("SELECT {} FROM organisations o WHERE o.id = $1", SELECT);
        Ok(sqlx::query_as::<_, Organisation>(&query).bind(id).fetch_one(conn).await?)
    }

    pub async fn insert(
        conn: &mut PgConnection,
        input: &OrganisationInput,
    ) -> Result<Organisation, DatabaseError> {
        let attributes = input.attributes.clone().unwrap_or_default();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO organisations (name, website, contact, phone_number, email, archived, \
             attributes, volunteer_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.website)
        .bind(&input.contact)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(input.archived)
        .bind(Json(attributes))
        .bind(input.volunteer_id)
        .fetch_one(&mut *conn)
        .await?;
        Self::fetch_by_id(conn, id).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        input: &OrganisationInput,
    ) -> Result<Organisation, DatabaseError> {
        let attributes = input.attributes.clone().unwrap_or_default();
        let updated = sqlx::query(
            "UPDATE organisations SET name = $1, website = $2, contact = $3, phone_number = $4, \
             email = $5, archived = $6, attributes = $7, volunteer_id = $8, updated_at = NOW() \
             WHERE id = $9",
        )
        .bind(&input.name)
        .bind(&input.website)
        .bind(&input.contact)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(input.archived)
        .bind(Json(attributes))
        .bind(input.volunteer_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Organisation {} not found", id)));
        }
        Self::fetch_by_id(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM organisations WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn request_count(pool: &PgPool) -> Result<RequestCount, DatabaseError> {
        let row = sqlx::query_as::<_, RequestCount>(
            "SELECT \
                COALESCE(SUM(src.phones), 0)::bigint AS phones, \
                COALESCE(SUM(src.laptops), 0)::bigint AS laptops, \
                COALESCE(SUM(src.tablets), 0)::bigint AS tablets, \
                COALESCE(SUM(src.all_in_ones), 0)::bigint AS all_in_ones, \
                COALESCE(SUM(src.desktops), 0)::bigint AS desktops, \
                COALESCE(SUM(src.other), 0)::bigint AS other, \
                COALESCE(SUM(src.chromebooks), 0)::bigint AS chromebooks, \
                COALESCE(SUM(src.comms_devices), 0)::bigint AS comms_devices \
             FROM ( \
               SELECT \
                 id, \
                 COALESCE((attributes->'request'->>'phones')::int + (attributes->'alternateRequest'->>'phones')::int, 0) AS phones, \
                 COALESCE((attributes->'request'->>'laptops')::int + (attributes->'alternateRequest'->>'laptops')::int, 0) AS laptops, \
                 COALESCE((attributes->'request'->>'tablets')::int + (attributes->'alternateRequest'->>'tablets')::int, 0) AS tablets, \
                 COALESCE((attributes->'request'->>'allInOnes')::int + (attributes->'alternateRequest'->>'allInOnes')::int, 0) AS all_in_ones, \
                 COALESCE((attributes->'request'->>'desktops')::int + (attributes->'alternateRequest'->>'desktops')::int, 0) AS desktops, \
                 COALESCE((attributes->'request'->>'other')::int + (attributes->'alternateRequest'->>'other')::int, 0) AS other, \
                 COALESCE((attributes->'request'->>'chromebooks')::int + (attributes->'alternateRequest'->>'chromebooks')::int, 0) AS chromebooks, \
                 COALESCE((attributes->'request'->>'commsDevices')::int + (attributes->'alternateRequest'->>'commsDevices')::int, 0) AS comms_devices \
               FROM organisations org \
               WHERE org.archived = false \
             ) AS src",
        )
        .fetch_one(pool)
        .await?;
        Ok(row)
    }
}
