use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::filter::expr::{BooleanBuilder, Leaf};
use crate::models::{Coordinates, Donor};

const SELECT: &str = "d.id, d.post_code, d.phone_number, d.email, d.name, d.referral, \
     d.created_at, d.updated_at, \
     (SELECT COUNT(*) FROM kits k WHERE k.donor_id = d.id) AS kit_count, \
     d.coordinates";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonorInput {
    pub post_code: String,
    pub phone_number: String,
    pub email: String,
    pub name: String,
    pub referral: String,
    #[serde(skip)]
    pub coordinates: Option<Coordinates>,
}

/// Merge an incoming submission over an existing record: non-blank
/// incoming contact fields win, blank ones keep what is stored. The
/// stored name is never overwritten.
pub fn merge_input(existing: &Donor, incoming: &DonorInput) -> DonorInput {
    fn pick(incoming: &str, existing: &str) -> String {
        if incoming.trim().is_empty() { existing.to_string() } else { incoming.to_string() }
    }
    DonorInput {
        post_code: pick(&incoming.post_code, &existing.post_code),
        phone_number: pick(&incoming.phone_number, &existing.phone_number),
        email: pick(&incoming.email, &existing.email),
        name: existing.name.clone(),
        referral: pick(&incoming.referral, &existing.referral),
        coordinates: incoming
            .coordinates
            .clone()
            .or_else(|| existing.coordinates.as_ref().map(|c| c.0.clone())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactKey {
    Email(String),
    Phone(String),
}

/// Lookup keys for find-or-merge, in the order they are tried: a
/// non-blank email first, then a non-blank phone number. Both blank
/// yields no keys, so a fresh record is always inserted.
pub fn lookup_keys(input: &DonorInput) -> Vec<ContactKey> {
    let mut keys = Vec::with_capacity(2);
    if !input.email.trim().is_empty() {
        keys.push(ContactKey::Email(input.email.clone()));
    }
    if !input.phone_number.trim().is_empty() {
        keys.push(ContactKey::Phone(input.phone_number.clone()));
    }
    keys
}

pub struct DonorRepository;

impl DonorRepository {
    pub fn reader() -> Repository<Donor> {
        Repository::new("donors", "d", SELECT)
    }

    pub async fn by_id(pool: &PgPool, id: i64) -> Result<Donor, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("d.\"id\" = ?", vec![id.into()]));
        Self::reader().find_404(pool, &filter).await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Donor>, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("d.\"email\" = ?", vec![email.into()]));
        Self::reader().find_one(pool, &filter).await
    }

    pub async fn find_by_phone_number(
        pool: &PgPool,
        phone_number: &str,
    ) -> Result<Option<Donor>, DatabaseError> {
        let mut filter = BooleanBuilder::new();
        filter.and_leaf(Leaf::new("d.\"phone_number\" = ?", vec![phone_number.into()]));
        Self::reader().find_one(pool, &filter).await
    }

    pub async fn fetch_by_id(conn: &mut PgConnection, id: i64) -> Result<Donor, DatabaseError> {
        let query = format!("SELECT {} FROM donors d WHERE d.id = $1", SELECT);
        Ok(sqlx::query_as::<_, Donor>(&query).bind(id).fetch_one(conn).await?)
    }

    pub async fn insert(conn: &mut PgConnection, input: &DonorInput) -> Result<Donor, DatabaseError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO donors (post_code, phone_number, email, name, referral, coordinates) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&input.post_code)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.name)
        .bind(&input.referral)
        .bind(input.coordinates.as_ref().map(Json))
        .fetch_one(&mut *conn)
        .await?;
        Self::fetch_by_id(conn, id).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        input: &DonorInput,
    ) -> Result<Donor, DatabaseError> {
        let updated = sqlx::query(
            "UPDATE donors SET post_code = $1, phone_number = $2, email = $3, name = $4, \
             referral = $5, coordinates = $6, updated_at = NOW() WHERE id = $7",
        )
        .bind(&input.post_code)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.name)
        .bind(&input.referral)
        .bind(input.coordinates.as_ref().map(Json))
        .bind(id)
        .execute(&mut *conn)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Donor {} not found", id)));
        }
        Self::fetch_by_id(conn, id).await
    }

    /// Find-or-merge on unique contact details: tried by non-blank email,
    /// then by non-blank phone number when the email matches nothing;
    /// with neither key, a fresh record is always inserted.
    pub async fn fetch_or_merge(
        conn: &mut PgConnection,
        input: DonorInput,
    ) -> Result<Donor, DatabaseError> {
        let mut existing = None;
        for key in lookup_keys(&input) {
            let (column, value) = match &key {
                ContactKey::Email(email) => ("email", email.clone()),
                ContactKey::Phone(phone) => ("phone_number", phone.clone()),
            };
            let query = format!("SELECT {} FROM donors d WHERE d.{} = $1", SELECT, column);
            existing = sqlx::query_as::<_, Donor>(&query)
                .bind(value)
                .fetch_optional(&mut *conn)
                .await?;
            if existing.is_some() {
                break;
            }
        }
        match existing {
            Some(donor) => {
                let merged = merge_input(&donor, &input);
                Self::update(conn, donor.id, &merged).await
            }
            None => Self::insert(conn, &input).await,
        }
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM donors WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn donor(email: &str, phone: &str, name: &str) -> Donor {
        Donor {
            id: 1,
            post_code: "SW9 8RR".into(),
            phone_number: phone.into(),
            email: email.into(),
            name: name.into(),
            referral: "web".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            kit_count: 0,
            coordinates: None,
        }
    }

    #[test]
    fn merge_keeps_stored_fields_when_incoming_is_blank() {
        let existing = donor("a@x.com", "070000", "Ada");
        let incoming = DonorInput {
            email: "a@x.com".into(),
            name: "  ".into(),
            phone_number: String::new(),
            post_code: "N1 9GU".into(),
            referral: String::new(),
            coordinates: None,
        };
        let merged = merge_input(&existing, &incoming);
        assert_eq!(merged.name, "Ada");
        assert_eq!(merged.phone_number, "070000");
        assert_eq!(merged.post_code, "N1 9GU");
        assert_eq!(merged.referral, "web");
    }

    #[test]
    fn merge_prefers_non_blank_incoming_contact_fields() {
        let existing = donor("a@x.com", "070000", "Ada");
        let incoming = DonorInput {
            email: "a@x.com".into(),
            name: String::new(),
            phone_number: "071111".into(),
            post_code: String::new(),
            referral: String::new(),
            coordinates: None,
        };
        let merged = merge_input(&existing, &incoming);
        assert_eq!(merged.phone_number, "071111");
        assert_eq!(merged.post_code, "SW9 8RR");
    }

    #[test]
    fn merge_never_overwrites_the_stored_name() {
        let existing = donor("a@x.com", "070000", "Ada");
        let incoming = DonorInput {
            email: "a@x.com".into(),
            name: "Somebody Else".into(),
            phone_number: String::new(),
            post_code: String::new(),
            referral: String::new(),
            coordinates: None,
        };
        assert_eq!(merge_input(&existing, &incoming).name, "Ada");
    }

    fn contact(email: &str, phone: &str) -> DonorInput {
        DonorInput {
            email: email.into(),
            phone_number: phone.into(),
            name: "Ada".into(),
            post_code: "SW9 8RR".into(),
            referral: String::new(),
            coordinates: None,
        }
    }

    #[test]
    fn lookup_tries_email_then_falls_back_to_phone() {
        assert_eq!(
            lookup_keys(&contact("a@x.com", "070000")),
            vec![ContactKey::Email("a@x.com".into()), ContactKey::Phone("070000".into())]
        );
    }

    #[test]
    fn blank_email_looks_up_by_phone_only() {
        assert_eq!(
            lookup_keys(&contact("  ", "070000")),
            vec![ContactKey::Phone("070000".into())]
        );
    }

    #[test]
    fn blank_phone_looks_up_by_email_only() {
        assert_eq!(
            lookup_keys(&contact("a@x.com", "")),
            vec![ContactKey::Email("a@x.com".into())]
        );
    }

    #[test]
    fn blank_contact_details_always_insert_a_fresh_record() {
        assert!(lookup_keys(&contact("  ", "")).is_empty());
    }
}
