//! License queries and schema constraints.

#[path = "../common/mod.rs"]
mod common;
use common::*;

fn new_license(license_id: &str, max_seats: i64) -> NewLicense {
    NewLicense {
        license_id: license_id.to_string(),
        key_digest: hash_key("key"),
        duration_seconds: ONE_DAY,
        max_seats,
    }
}

#[test]
fn test_create_and_fetch_license() {
    let ctx = TestContext::new();
    let conn = ctx.state.db.get().unwrap();

    let created = queries::create_license(&conn, &new_license("DB-1", 3), T0).unwrap();
    assert!(created.id.starts_with("sk_lic_"));

    let fetched = queries::get_license_by_license_id(&conn, "DB-1")
        .unwrap()
        .expect("license should exist");
    assert_eq!(fetched, created);
    assert!(fetched.active);
    assert_eq!(fetched.first_activation_at, None);
    assert_eq!(fetched.expires_at, None);
    assert_eq!(fetched.key_digest, hash_key("key"));
}

#[test]
fn test_duplicate_license_id_is_reported() {
    let ctx = TestContext::new();
    let conn = ctx.state.db.get().unwrap();

    queries::create_license(&conn, &new_license("DB-DUP", 1), T0).unwrap();
    let err = queries::create_license(&conn, &new_license("DB-DUP", 2), T0).unwrap_err();

    assert!(matches!(err, AppError::DuplicateLicense(ref id) if id == "DB-DUP"));
    assert_eq!(queries::count_licenses(&conn).unwrap(), 1);
}

#[test]
fn test_schema_rejects_non_positive_seats() {
    let ctx = TestContext::new();
    let conn = ctx.state.db.get().unwrap();

    let err = queries::create_license(&conn, &new_license("DB-ZERO", 0), T0).unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
    assert!(!queries::license_exists(&conn, "DB-ZERO").unwrap());
}

#[test]
fn test_license_exists() {
    let ctx = TestContext::new();
    let conn = ctx.state.db.get().unwrap();

    assert!(!queries::license_exists(&conn, "DB-EX").unwrap());
    queries::create_license(&conn, &new_license("DB-EX", 1), T0).unwrap();
    assert!(queries::license_exists(&conn, "DB-EX").unwrap());
    assert!(!queries::license_exists(&conn, "db-ex").unwrap());
}

#[test]
fn test_list_license_ids_sorted() {
    let ctx = TestContext::new();
    let conn = ctx.state.db.get().unwrap();

    for id in ["charlie", "alpha", "bravo"] {
        queries::create_license(&conn, &new_license(id, 1), T0).unwrap();
    }

    assert_eq!(
        queries::list_license_ids(&conn).unwrap(),
        vec!["alpha", "bravo", "charlie"]
    );
}

#[test]
fn test_license_summaries_include_derived_seat_count() {
    let ctx = TestContext::new();
    ctx.create_license("SUM-A", "key", ONE_DAY, 3);
    ctx.create_license("SUM-B", "key", 0, 1);

    ctx.state.engine.activate("SUM-A", "key", "m1").unwrap();
    ctx.state.engine.activate("SUM-A", "key", "m2").unwrap();

    let conn = ctx.state.db.get().unwrap();
    let (items, total) = queries::list_license_summaries_paginated(&conn, 10, 0).unwrap();
    assert_eq!(total, 2);
    assert_eq!(items.len(), 2);

    let a = items.iter().find(|s| s.license_id == "SUM-A").unwrap();
    assert_eq!(a.used_seats, 2);
    assert_eq!(a.max_seats, 3);
    assert_eq!(a.first_activation_at, Some(T0));
    assert_eq!(a.expires_at, Some(T0 + ONE_DAY));

    let b = items.iter().find(|s| s.license_id == "SUM-B").unwrap();
    assert_eq!(b.used_seats, 0);
    assert_eq!(b.expires_at, None);
}

#[test]
fn test_license_summaries_paginate() {
    let ctx = TestContext::new();
    for i in 0..5 {
        ctx.create_license(&format!("PAGE-{}", i), "key", ONE_DAY, 1);
    }

    let conn = ctx.state.db.get().unwrap();
    let (first, total) = queries::list_license_summaries_paginated(&conn, 2, 0).unwrap();
    let (last, _) = queries::list_license_summaries_paginated(&conn, 2, 4).unwrap();

    assert_eq!(total, 5);
    assert_eq!(first.len(), 2);
    assert_eq!(last.len(), 1);
}

#[test]
fn test_first_activation_cannot_be_rewritten() {
    let ctx = TestContext::new();
    let license = ctx.create_license("ONCE-1", "key", ONE_HOUR, 1);
    let conn = ctx.state.db.get().unwrap();

    queries::set_first_activation(&conn, &license.id, T0, Some(T0 + ONE_HOUR)).unwrap();
    let err = queries::set_first_activation(&conn, &license.id, T0 + 10, Some(T0 + 10 + ONE_HOUR))
        .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    let stored = ctx.license("ONCE-1");
    assert_eq!(stored.first_activation_at, Some(T0));
    assert_eq!(stored.expires_at, Some(T0 + ONE_HOUR));
}
