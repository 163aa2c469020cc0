//! Admin bearer-token authentication.

use axum::body::Body;
use axum::http::{Request, StatusCode};

#[path = "../common/mod.rs"]
mod common;
use common::*;

fn get_with_auth(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_admin_without_token_is_unauthorized() {
    let ctx = TestContext::new();

    let (status, json) = send(ctx.app(), get_with_auth("/admin/licenses", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "unauthorized");
}

#[tokio::test]
async fn test_admin_with_wrong_token_is_unauthorized() {
    let ctx = TestContext::new();

    let (status, _) = send(
        ctx.app(),
        get_with_auth("/admin/licenses/ids", Some("Bearer not-the-key")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_with_non_bearer_scheme_is_unauthorized() {
    let ctx = TestContext::new();

    let (status, _) = send(
        ctx.app(),
        get_with_auth("/admin/activations", Some(&format!("Basic {}", ADMIN_KEY))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_locked_when_no_key_configured() {
    let ctx = TestContext::with_admin_key(None);

    let (status, _) = send(ctx.app(), admin_get("/admin/licenses")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_with_correct_token_is_allowed() {
    let ctx = TestContext::new();

    let (status, _) = send(ctx.app(), admin_get("/admin/licenses")).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unauthorized_create_does_not_insert() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/admin/licenses")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "license_id": "SNEAKY",
                "raw_key": "key",
                "duration_seconds": 0,
                "max_seats": 1
            })
            .to_string(),
        ))
        .unwrap();
    let (status, _) = send(ctx.app(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let conn = ctx.state.db.get().unwrap();
    assert!(!queries::license_exists(&conn, "SNEAKY").unwrap());
}
