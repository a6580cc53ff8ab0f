use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::models::{Coordinates, Kit, KitAttributes, KitStatus, KitType, KitVolunteerRole, Volunteer};

const SELECT: &str = "k.id, k.type, k.status, k.model, k.location, k.age, k.archived, \
     k.created_at, k.updated_at, k.attributes, k.coordinates, k.donor_id, k.organisation_id";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KitInput {
    #[serde(rename = "type")]
    pub kit_type: KitType,
    pub status: KitStatus,
    pub model: String,
    pub location: String,
    pub age: i32,
    pub archived: bool,
    pub attributes: Option<KitAttributes>,
    pub donor_id: Option<i64>,
    pub organisation_id: Option<i64>,
    #[serde(skip)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct KitStatusCount {
    pub status: KitStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct KitTypeCount {
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kit_type: KitType,
    pub count: i64,
}

pub struct KitRepository;

impl KitRepository {
    pub fn reader() -> Repository<Kit> {
        Repository::new("kits", "k", SELECT)
    }

    pub async fn by_id(pool: &PgPool, id: i64) -> Result<Kit, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("k.\"id\" = ?", vec![id.into()]));
        Self::reader().find_404(pool, &filter).await
    }

    pub async fn fetch_by_id(conn: &mut PgConnection, id: i64) -> Result<Kit, DatabaseError> {
        let query = format!("SELECT {} FROM kits k WHERE k.id = $1", SELECT);
        Ok(sqlx::query_as::<_, Kit>(&query).bind(id).fetch_one(conn).await?)
    }

    pub async fn insert(conn: &mut PgConnection, input: &KitInput) -> Result<Kit, DatabaseError> {
        let attributes = input.attributes.clone().unwrap_or_default();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO kits (type, status, model, location, age, archived, attributes, \
             coordinates, donor_id, organisation_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
        )
        .bind(input.kit_type)
        .bind(input.status)
        .bind(&input.model)
        .bind(&input.location)
        .bind(input.age)
        .bind(input.archived)
        .bind(Json(attributes))
        .bind(input.coordinates.as_ref().map(Json))
        .bind(input.donor_id)
        .bind(input.organisation_id)
        .fetch_one(&mut *conn)
        .await?;
        Self::fetch_by_id(conn, id).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        input: &KitInput,
    ) -> Result<Kit, DatabaseError> {
        let attributes = input.attributes.clone().unwrap_or_default();
        let updated = sqlx::query(
            "UPDATE kits SET type = $1, status = $2, model = $3, location = $4, age = $5, \
             archived = $6, attributes = $7, coordinates = $8, donor_id = $9, \
             organisation_id = $10, updated_at = NOW() WHERE id = $11",
        )
        .bind(input.kit_type)
        .bind(input.status)
        .bind(&input.model)
        .bind(&input.location)
        .bind(input.age)
        .bind(input.archived)
        .bind(Json(attributes))
        .bind(input.coordinates.as_ref().map(Json))
        .bind(input.donor_id)
        .bind(input.organisation_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Kit {} not found", id)));
        }
        Self::fetch_by_id(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM kits WHERE id = $1").bind(id).execute(conn).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the volunteers holding `role` on a kit with exactly
    /// `volunteer_ids`. Returns the ids that were newly assigned.
    pub async fn replace_role_assignments(
        conn: &mut PgConnection,
        kit_id: i64,
        role: KitVolunteerRole,
        volunteer_ids: &[i64],
    ) -> Result<Vec<i64>, DatabaseError> {
        let existing: Vec<i64> = sqlx::query_scalar(
            "SELECT volunteer_id FROM kit_volunteers WHERE kit_id = $1 AND role = $2",
        )
        .bind(kit_id)
        .bind(role)
        .fetch_all(&mut *conn)
        .await?;

        sqlx::query(
            "DELETE FROM kit_volunteers WHERE kit_id = $1 AND role = $2 \
             AND volunteer_id <> ALL($3)",
        )
        .bind(kit_id)
        .bind(role)
        .bind(volunteer_ids)
        .execute(&mut *conn)
        .await?;

        let mut added = Vec::new();
        for volunteer_id in volunteer_ids {
            if !existing.contains(volunteer_id) {
                sqlx::query(
                    "INSERT INTO kit_volunteers (kit_id, volunteer_id, role) \
                     VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
                )
                .bind(kit_id)
                .bind(volunteer_id)
                .bind(role)
                .execute(&mut *conn)
                .await?;
                added.push(*volunteer_id);
            }
        }
        Ok(added)
    }

    /// Volunteers holding any role on the kit.
    pub async fn assigned_volunteers(
        conn: &mut PgConnection,
        kit_id: i64,
    ) -> Result<Vec<Volunteer>, DatabaseError> {
        let query = "SELECT v.id, v.name, v.phone_number, v.email, v.expertise, v.sub_group, \
             v.storage, v.transport, v.post_code, v.availability, v.consent, \
             v.created_at, v.updated_at, \
             (SELECT COUNT(*) FROM kit_volunteers kc WHERE kc.volunteer_id = v.id) AS kit_count, \
             v.coordinates, v.attributes \
             FROM volunteers v \
             JOIN kit_volunteers kv ON kv.volunteer_id = v.id WHERE kv.kit_id = $1";
        Ok(sqlx::query_as::<_, Volunteer>(query).bind(kit_id).fetch_all(conn).await?)
    }

    /// Kit counts per lifecycle status, archived kits excluded.
    pub async fn status_count(pool: &PgPool) -> Result<Vec<KitStatusCount>, DatabaseError> {
        let rows = sqlx::query_as::<_, KitStatusCount>(
            "SELECT k.status AS status, COUNT(*) AS count FROM kits k \
             WHERE k.archived = false GROUP BY k.status",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Kit counts per device type, archived kits excluded.
    pub async fn type_count(pool: &PgPool) -> Result<Vec<KitTypeCount>, DatabaseError> {
        let rows = sqlx::query_as::<_, KitTypeCount>(
            "SELECT k.type AS type, COUNT(*) AS count FROM kits k \
             WHERE k.archived = false GROUP BY k.type",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
