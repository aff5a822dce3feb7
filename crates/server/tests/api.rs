use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db.clone()).build();
    server::app(engine, db)
}

fn basic_auth(user: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
    format!("Basic {encoded}")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, basic_auth(user, "password"));
    }
    let request = match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, user: &str) {
    let (status, _) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({
            "username": user,
            "password": "password",
            "name": format!("{user} tester"),
            "email": format!("{user}@example.com"),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn new_group(app: &Router, creator: &str, members: &[&str]) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/groups",
        Some(creator),
        Some(json!({ "name": "Trip" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = body["id"].as_str().unwrap().to_string();

    for member in members {
        let (status, _) = send(
            app,
            "POST",
            &format!("/groups/{group_id}/members"),
            Some(creator),
            Some(json!({ "username": member })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    group_id
}

#[tokio::test]
async fn registration_and_auth_round_trip() {
    let app = app().await;
    register(&app, "ana").await;

    // No credentials.
    let (status, _) = send(&app, "GET", "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong password.
    let request = Request::builder()
        .method("GET")
        .uri("/users/me")
        .header(header::AUTHORIZATION, basic_auth("ana", "wrong"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/users/me", Some("ana"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ana");
    assert_eq!(body["balance_cents"], 0);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app().await;
    register(&app, "ana").await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({
            "username": "ana",
            "password": "password",
            "name": "Ana Again",
            "email": "again@example.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn invalid_registration_is_unprocessable() {
    let app = app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({
            "username": "dora",
            "password": "password",
            "name": "Do",
            "email": "dora@example.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expense_flow_updates_balances() {
    let app = app().await;
    register(&app, "ana").await;
    register(&app, "ben").await;
    let group_id = new_group(&app, "ana", &["ben"]).await;

    let (status, body) = send(
        &app,
        "POST",
        "/expenses",
        Some("ana"),
        Some(json!({
            "group_id": group_id,
            "amount_cents": 1000,
            "description": "Dinner",
            "category": "food",
            "paid_by": "ana",
            "participants": ["ana", "ben"],
            "split": { "kind": "equal" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let expense_id = body["expense"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["expense"]["amount_cents"], 1000);

    let (status, body) = send(&app, "GET", "/balance/gross", Some("ana"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owed_to_user_cents"], 500);
    assert_eq!(body["balance_cents"], 500);

    let (_, body) = send(&app, "GET", "/balance/gross", Some("ben"), None).await;
    assert_eq!(body["user_owes_cents"], 500);

    // Ben settles his share; net drops to zero, gross stays.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/expenses/{expense_id}/payment"),
        Some("ben"),
        Some(json!({ "username": "ben", "paid": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paid"], true);

    let (_, body) = send(&app, "GET", "/balance/net", Some("ana"), None).await;
    assert_eq!(body["owed_to_user_cents"], 0);
    let (_, body) = send(&app, "GET", "/balance/gross", Some("ana"), None).await;
    assert_eq!(body["owed_to_user_cents"], 500);
}

#[tokio::test]
async fn group_views_are_member_gated() {
    let app = app().await;
    register(&app, "ana").await;
    register(&app, "ben").await;
    register(&app, "carla").await;
    let group_id = new_group(&app, "ana", &["ben"]).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/summary"),
        Some("carla"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/groups/nope/summary", Some("ana"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn breakdown_reports_aggregated_pairs() {
    let app = app().await;
    register(&app, "ana").await;
    register(&app, "ben").await;
    let group_id = new_group(&app, "ana", &["ben"]).await;

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            "/expenses",
            Some("ana"),
            Some(json!({
                "group_id": group_id,
                "amount_cents": 1000,
                "description": "Taxi",
                "category": null,
                "paid_by": "ana",
                "participants": ["ana", "ben"],
                "split": { "kind": "full_cover" },
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/breakdown"),
        Some("ben"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["debtor"], "ben");
    assert_eq!(rows[0]["creditor"], "ana");
    assert_eq!(rows[0]["total_cents"], 2000);
}

#[tokio::test]
async fn custom_split_mismatch_is_unprocessable() {
    let app = app().await;
    register(&app, "ana").await;
    register(&app, "ben").await;
    let group_id = new_group(&app, "ana", &["ben"]).await;

    let (status, body) = send(
        &app,
        "POST",
        "/expenses",
        Some("ana"),
        Some(json!({
            "group_id": group_id,
            "amount_cents": 10000,
            "description": "Hotel",
            "category": null,
            "paid_by": "ana",
            "participants": ["ana", "ben"],
            "split": { "kind": "custom", "amounts": [
                { "username": "ana", "amount_cents": 4000 },
                { "username": "ben", "amount_cents": 5000 },
            ]},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("custom"));
}

#[tokio::test]
async fn unknown_netting_is_a_bad_request() {
    let app = app().await;
    register(&app, "ana").await;
    let group_id = new_group(&app, "ana", &[]).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/balance/bogus"),
        Some("ana"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/balance/net"),
        Some("ana"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn friends_and_activity_endpoints() {
    let app = app().await;
    register(&app, "ana").await;
    register(&app, "ben").await;
    let group_id = new_group(&app, "ana", &["ben"]).await;

    let (status, _) = send(
        &app,
        "POST",
        "/friends",
        Some("ana"),
        Some(json!({ "username": "ben" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/friends",
        Some("ana"),
        Some(json!({ "username": "ben" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/expenses",
        Some("ana"),
        Some(json!({
            "group_id": group_id,
            "amount_cents": 800,
            "description": "Tickets",
            "category": null,
            "paid_by": "ana",
            "participants": ["ana", "ben"],
            "split": { "kind": "full_cover" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/friends/ben", Some("ana"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owes_me_cents"], 800);
    assert_eq!(body["shared_groups"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/activity", Some("ben"), None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = body.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["direction"], "owes");
    assert_eq!(feed[0]["amount_cents"], 800);

    let (status, body) = send(&app, "GET", "/debts/owed", Some("ben"), None).await;
    assert_eq!(status, StatusCode::OK);
    let creditors = body.as_array().unwrap();
    assert_eq!(creditors.len(), 1);
    assert_eq!(creditors[0]["creditor"], "ana");
    assert_eq!(creditors[0]["total_cents"], 800);

    let (status, _) = send(&app, "DELETE", "/friends/ben", Some("ana"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/friends/ben", Some("ana"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_creator_deletes_the_group() {
    let app = app().await;
    register(&app, "ana").await;
    register(&app, "ben").await;
    let group_id = new_group(&app, "ana", &["ben"]).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/groups/{group_id}"),
        Some("ben"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/groups/{group_id}"),
        Some("ana"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/groups", Some("ana"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}
