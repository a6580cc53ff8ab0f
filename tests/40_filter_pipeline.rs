//! End-to-end predicate assembly: where-input JSON through visibility
//! and pagination down to the SQL a collection handler would run.

use serde_json::json;

use techkit_api::auth::{decode_jwt, generate_jwt, Caller, Claims};
use techkit_api::filter::inputs::{DonorWhereInput, KitWhereInput};
use techkit_api::filter::{KeyValuePair, PaginationInput};
use techkit_api::visibility::{row_filter, EntityKind};

fn caller(email: &str, perms: &[&str]) -> Caller {
    Caller {
        name: "Test".into(),
        email: email.into(),
        permissions: perms.iter().map(|p| p.to_string()).collect(),
    }
}

#[test]
fn assigned_caller_search_combines_visibility_and_where_input() {
    let input: KitWhereInput = serde_json::from_value(json!({
        "archived": { "_eq": false }
    }))
    .unwrap();

    let mut filter = row_filter(EntityKind::Kits, &caller("me@x.com", &["read:kits:assigned"]), "k");
    filter.and(input.build("k"));

    let (sql, params) = filter.to_sql(0);
    assert_eq!(
        sql,
        "(EXISTS (SELECT 1 FROM kit_volunteers akv JOIN volunteers av \
         ON av.id = akv.volunteer_id \
         WHERE akv.kit_id = k.id AND av.\"email\" = $1) \
         AND k.\"archived\" = $2)"
    );
    assert_eq!(params, vec![json!("me@x.com"), json!(false)]);
}

#[test]
fn admin_caller_search_is_only_the_where_input() {
    let input: KitWhereInput = serde_json::from_value(json!({
        "status": { "_eq": "READY" }
    }))
    .unwrap();

    let mut filter = row_filter(EntityKind::Kits, &caller("a@x.com", &["admin:kits"]), "k");
    filter.and(input.build("k"));

    let (sql, _) = filter.to_sql(0);
    assert_eq!(sql, "k.\"status\" = ($1)::kit_status");
}

#[test]
fn unauthorised_caller_matches_no_rows_even_with_a_filter() {
    let input: KitWhereInput = serde_json::from_value(json!({
        "archived": { "_eq": false }
    }))
    .unwrap();

    let mut filter = row_filter(EntityKind::Kits, &Caller::anonymous(), "k");
    filter.and(input.build("k"));

    let (sql, _) = filter.to_sql(0);
    assert_eq!(sql, "(1=0 AND k.\"archived\" = $1)");
}

#[test]
fn or_accumulates_over_previously_built_fields() {
    let input: DonorWhereInput = serde_json::from_value(json!({
        "email": { "_eq": "a@x.com" },
        "name": { "_eq": "Ada" },
        "OR": [ { "referral": { "_eq": "web" } } ]
    }))
    .unwrap();

    let (sql, _) = input.build("d").to_sql(0);
    assert_eq!(sql, "((d.\"email\" = $1 AND d.\"name\" = $2) OR d.\"referral\" = $3)");
}

#[test]
fn pagination_tail_follows_the_predicate() {
    let page = PaginationInput {
        page: 2,
        size: 10,
        sort: vec![KeyValuePair { key: "createdAt".into(), value: "desc".into() }],
    };
    assert_eq!(page.to_sql("k").unwrap(), "ORDER BY k.\"created_at\" DESC LIMIT 10 OFFSET 20");
}

#[test]
fn token_claims_drive_visibility() {
    std::env::set_var("JWT_SECRET", "pipeline-test-secret");
    let claims = Claims::new(
        "auth0|42".into(),
        "vol@x.com".into(),
        "Vol".into(),
        vec!["read:volunteers:assigned".into()],
    );
    let token = generate_jwt(&claims).unwrap();
    let caller = Caller::from_claims(decode_jwt(&token).unwrap());

    let filter = row_filter(EntityKind::Volunteers, &caller, "v");
    let (sql, params) = filter.to_sql(0);
    assert_eq!(sql, "v.\"email\" = $1");
    assert_eq!(params, vec![json!("vol@x.com")]);
}
