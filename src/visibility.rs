//! Row-level visibility. Each permission-gated entity type maps the
//! caller's permissions onto a predicate that is ANDed with whatever
//! where-input the caller supplied.

use crate::auth::Caller;
use crate::filter::expr::{BooleanBuilder, Leaf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Kits,
    Donors,
    Volunteers,
    Organisations,
    Emails,
}

impl EntityKind {
    fn permission_name(&self) -> &'static str {
        match self {
            Self::Kits => "kits",
            Self::Donors => "donors",
            Self::Volunteers => "volunteers",
            Self::Organisations => "organisations",
            Self::Emails => "emails",
        }
    }
}

/// The predicate restricting which rows `caller` may see, built against
/// the entity table aliased as `alias`.
///
/// admin:<entity> or read:<entity> sees everything;
/// read:<entity>:assigned sees rows linked to the caller's email;
/// anything less sees nothing.
pub fn row_filter(kind: EntityKind, caller: &Caller, alias: &str) -> BooleanBuilder {
    let entity = kind.permission_name();
    if caller.has_permission(&format!("admin:{}", entity))
        || caller.has_permission(&format!("read:{}", entity))
    {
        return BooleanBuilder::new();
    }
    if caller.has_permission(&format!("read:{}:assigned", entity)) && !caller.email.is_empty() {
        return assigned_filter(kind, &caller.email, alias);
    }
    BooleanBuilder::match_none()
}

fn assigned_filter(kind: EntityKind, email: &str, alias: &str) -> BooleanBuilder {
    let mut builder = BooleanBuilder::new();
    match kind {
        EntityKind::Volunteers => {
            builder.and_leaf(Leaf::new(
                format!("{}.\"email\" = ?", alias),
                vec![email.into()],
            ));
        }
        EntityKind::Kits => {
            let mut inner = BooleanBuilder::new();
            inner.and_leaf(Leaf::new("av.\"email\" = ?", vec![email.into()]));
            builder.and_exists(
                "kit_volunteers akv JOIN volunteers av ON av.id = akv.volunteer_id",
                format!("akv.kit_id = {}.id", alias),
                inner,
            );
        }
        EntityKind::Donors => {
            // Donors the caller can reach through a kit they hold a role on
            let mut volunteer_link = BooleanBuilder::new();
            volunteer_link.and_leaf(Leaf::new("av.\"email\" = ?", vec![email.into()]));
            let mut kit_link = BooleanBuilder::new();
            kit_link.and_exists(
                "kit_volunteers akv JOIN volunteers av ON av.id = akv.volunteer_id",
                "akv.kit_id = ak.id",
                volunteer_link,
            );
            builder.and_exists("kits ak", format!("ak.donor_id = {}.id", alias), kit_link);
        }
        // No assignment relation, the assigned grant yields nothing
        EntityKind::Organisations | EntityKind::Emails => {
            return BooleanBuilder::match_none();
        }
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn caller(email: &str, perms: &[&str]) -> Caller {
        Caller {
            name: String::new(),
            email: email.to_string(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn admin_sees_everything() {
        let filter = row_filter(EntityKind::Kits, &caller("a@x.com", &["admin:kits"]), "k");
        assert!(filter.is_empty());
        assert_eq!(filter.to_sql(0).0, "1=1");
    }

    #[test]
    fn plain_read_sees_everything() {
        let filter = row_filter(EntityKind::Donors, &caller("a@x.com", &["read:donors"]), "d");
        assert!(filter.is_empty());
    }

    #[test]
    fn no_permission_sees_nothing() {
        let filter = row_filter(EntityKind::Kits, &caller("a@x.com", &["read:donors"]), "k");
        assert_eq!(filter.to_sql(0).0, "1=0");
    }

    #[test]
    fn anonymous_sees_nothing() {
        let filter = row_filter(EntityKind::Volunteers, &Caller::anonymous(), "v");
        assert_eq!(filter.to_sql(0).0, "1=0");
    }

    #[test]
    fn assigned_without_email_sees_nothing() {
        let filter = row_filter(EntityKind::Kits, &caller("", &["read:kits:assigned"]), "k");
        assert_eq!(filter.to_sql(0).0, "1=0");
    }

    #[test]
    fn assigned_volunteer_is_restricted_to_own_row() {
        let filter = row_filter(
            EntityKind::Volunteers,
            &caller("me@x.com", &["read:volunteers:assigned"]),
            "v",
        );
        let (sql, params) = filter.to_sql(0);
        assert_eq!(sql, "v.\"email\" = $1");
        assert_eq!(params, vec![json!("me@x.com")]);
    }

    #[test]
    fn assigned_kits_link_through_role_assignments() {
        let filter =
            row_filter(EntityKind::Kits, &caller("me@x.com", &["read:kits:assigned"]), "k");
        let (sql, params) = filter.to_sql(0);
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM kit_volunteers akv JOIN volunteers av \
             ON av.id = akv.volunteer_id \
             WHERE akv.kit_id = k.id AND av.\"email\" = $1)"
        );
        assert_eq!(params, vec![json!("me@x.com")]);
    }

    #[test]
    fn assigned_donors_link_transitively_through_kits() {
        let filter =
            row_filter(EntityKind::Donors, &caller("me@x.com", &["read:donors:assigned"]), "d");
        let (sql, _) = filter.to_sql(0);
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM kits ak WHERE ak.donor_id = d.id AND \
             EXISTS (SELECT 1 FROM kit_volunteers akv JOIN volunteers av \
             ON av.id = akv.volunteer_id \
             WHERE akv.kit_id = ak.id AND av.\"email\" = $1))"
        );
    }

    #[test]
    fn visibility_conjoins_with_user_filters() {
        let mut filter =
            row_filter(EntityKind::Kits, &caller("me@x.com", &["read:kits:assigned"]), "k");
        filter.and_leaf(Leaf::new("k.\"archived\" = ?", vec![json!(false)]));
        let (sql, _) = filter.to_sql(0);
        assert!(sql.starts_with("(EXISTS"));
        assert!(sql.ends_with("AND k.\"archived\" = $2)"));
    }
}
