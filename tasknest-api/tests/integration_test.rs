/// Integration tests for the TaskNest API
///
/// These tests drive the full router end-to-end against the in-memory store:
/// - Registration, login, and the authentication gate
/// - Owner-scoped task and category operations
/// - Cross-user isolation

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{TestContext, TEST_JWT_SECRET};
use serde_json::json;
use tasknest_shared::auth::jwt::{TokenIssuer, TokenValidator};

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn test_register_login_me() {
    let ctx = TestContext::new();

    let (status, body) = ctx.register("alice", "pw123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert!(body.get("password_hash").is_none());
    let id = body["id"].as_i64().unwrap();

    let (status, body) = ctx.login("alice", "pw123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    let token = body["token"].as_str().unwrap().to_string();

    // The token resolves to the same identity
    let claims = TokenValidator::new(TEST_JWT_SECRET).validate(&token).unwrap();
    assert_eq!(claims.user_id, id);

    let (status, body) = ctx
        .send(Method::GET, "/me", Some(&format!("Bearer {}", token)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], id);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn test_wrong_password_matches_unknown_user() {
    let ctx = TestContext::new();
    ctx.register("alice", "pw123").await;

    let (wrong_status, wrong_body) = ctx.login("alice", "nope").await;
    let (unknown_status, unknown_body) = ctx.login("nobody", "pw123").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_duplicate_registration() {
    let ctx = TestContext::new();

    let (status, _) = ctx.register("alice", "pw123").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx.register("alice", "different").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already exists");
    assert_eq!(ctx.store.user_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_registration() {
    let ctx = TestContext::new();

    let (a, b) = tokio::join!(ctx.register("twin", "pw-a"), ctx.register("twin", "pw-b"));
    let statuses = [a.0, b.0];

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(),
        1
    );
    assert_eq!(ctx.store.user_count().await, 1);
}

#[tokio::test]
async fn test_register_validation() {
    let ctx = TestContext::new();

    let (status, body) = ctx.register("", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = ctx.register(&"x".repeat(65), "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(Method::POST, "/register", None, Some(json!({ "username": "bob" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new();

    for (method, uri) in [
        (Method::GET, "/me"),
        (Method::GET, "/tasks"),
        (Method::POST, "/tasks"),
        (Method::GET, "/tasks/1"),
        (Method::DELETE, "/tasks/1"),
        (Method::GET, "/categories"),
        (Method::DELETE, "/categories/1"),
    ] {
        let (status, body) = ctx.send(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_invalid_tokens_rejected() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;

    let expired = TokenIssuer::new(TEST_JWT_SECRET, Duration::hours(72))
        .issue_at(alice.id, "alice", Utc::now() - Duration::hours(73))
        .unwrap()
        .token;
    let forged = TokenIssuer::new("a-completely-different-secret-32-bytes", Duration::hours(72))
        .issue(alice.id, "alice")
        .unwrap()
        .token;

    let mut tampered = alice.token.clone().into_bytes();
    let dot = tampered.iter().position(|b| *b == b'.').unwrap();
    tampered[dot + 3] = if tampered[dot + 3] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    for header in [
        format!("Bearer {}", expired),
        format!("Bearer {}", forged),
        format!("Bearer {}", tampered),
        "Bearer not.a.jwt".to_string(),
        format!("Token {}", alice.token),
    ] {
        let (status, _) = ctx.send(Method::GET, "/me", Some(&header), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", header);
    }

    let (status, _) = ctx.send_as(&alice, Method::GET, "/me", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_task_crud() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;
    let due = (Utc::now() + Duration::days(2)).to_rfc3339();

    let (status, task) = ctx
        .send_as(
            &alice,
            Method::POST,
            "/tasks",
            Some(json!({ "title": "Buy milk", "description": "2 liters", "due_date": due })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["user_id"], alice.id);
    assert_eq!(task["completed"], false);
    let id = task["id"].as_i64().unwrap();
    let uri = format!("/tasks/{}", id);

    let (status, fetched) = ctx.send_as(&alice, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Buy milk");

    let (status, updated) = ctx
        .send_as(
            &alice,
            Method::PUT,
            &uri,
            Some(json!({ "title": "Buy oat milk", "completed": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Buy oat milk");
    assert!(updated["description"].is_null());

    let (status, patched) = ctx
        .send_as(&alice, Method::PATCH, &uri, Some(json!({ "completed": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["completed"], true);

    let (status, _) = ctx.send_as(&alice, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send_as(&alice, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_validation() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;
    let past = (Utc::now() - Duration::hours(1)).to_rfc3339();

    let cases = [
        json!({ "title": "" }),
        json!({ "title": "   " }),
        json!({ "title": "x".repeat(256) }),
        json!({ "title": "ok", "due_date": "next tuesday" }),
        json!({ "title": "ok", "due_date": past }),
        json!({ "description": "no title" }),
    ];

    for body in cases {
        let (status, _) = ctx
            .send_as(&alice, Method::POST, "/tasks", Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }

    let (_, tasks) = ctx.send_as(&alice, Method::GET, "/tasks", None).await;
    assert_eq!(tasks.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_other_users_task_is_not_found() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;

    let (_, task) = ctx
        .send_as(&alice, Method::POST, "/tasks", Some(json!({ "title": "private" })))
        .await;
    let uri = format!("/tasks/{}", task["id"]);

    let (status, _) = ctx.send_as(&bob, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send_as(&bob, Method::PUT, &uri, Some(json!({ "title": "pwned" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .send_as(&bob, Method::PATCH, &uri, Some(json!({ "completed": true })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send_as(&bob, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Same response as for an id that never existed
    let (missing_status, missing_body) =
        ctx.send_as(&bob, Method::GET, "/tasks/999999", None).await;
    let (foreign_status, foreign_body) = ctx.send_as(&bob, Method::GET, &uri, None).await;
    assert_eq!(missing_status, foreign_status);
    assert_eq!(missing_body, foreign_body);

    let (_, bobs_tasks) = ctx.send_as(&bob, Method::GET, "/tasks", None).await;
    assert_eq!(bobs_tasks.as_array().unwrap().len(), 0);

    // Alice's task is untouched
    let (status, unchanged) = ctx.send_as(&alice, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["title"], "private");
    assert_eq!(unchanged["completed"], false);
}

#[tokio::test]
async fn test_categories_and_filtering() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;

    let (status, work) = ctx
        .send_as(&alice, Method::POST, "/categories", Some(json!({ "name": "work" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let work_id = work["id"].as_i64().unwrap();

    ctx.send_as(
        &alice,
        Method::POST,
        "/tasks",
        Some(json!({ "title": "report", "category_id": work_id })),
    )
    .await;
    ctx.send_as(&alice, Method::POST, "/tasks", Some(json!({ "title": "laundry" })))
        .await;

    let (_, all) = ctx.send_as(&alice, Method::GET, "/tasks", None).await;
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["laundry", "report"]);

    let (_, filtered) = ctx
        .send_as(&alice, Method::GET, &format!("/tasks?category_id={}", work_id), None)
        .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["title"], "report");

    let (status, fetched) = ctx
        .send_as(&alice, Method::GET, &format!("/categories/{}", work_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "work");

    let (status, _) = ctx
        .send_as(&alice, Method::DELETE, &format!("/categories/{}", work_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The task survives without a category
    let (_, all) = ctx.send_as(&alice, Method::GET, "/tasks", None).await;
    let report = all
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["title"] == "report")
        .unwrap();
    assert!(report["category_id"].is_null());
}

#[tokio::test]
async fn test_cannot_use_or_see_other_users_category() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;

    let (_, work) = ctx
        .send_as(&alice, Method::POST, "/categories", Some(json!({ "name": "work" })))
        .await;
    let uri = format!("/categories/{}", work["id"]);

    let (status, body) = ctx
        .send_as(
            &bob,
            Method::POST,
            "/tasks",
            Some(json!({ "title": "sneaky", "category_id": work["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");

    let (status, _) = ctx.send_as(&bob, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send_as(&bob, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bobs) = ctx.send_as(&bob, Method::GET, "/categories", None).await;
    assert_eq!(bobs.as_array().unwrap().len(), 0);

    let (status, _) = ctx.send_as(&alice, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_category_validation() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice").await;

    for body in [json!({ "name": "" }), json!({ "name": "n".repeat(101) }), json!({})] {
        let (status, _) = ctx
            .send_as(&alice, Method::POST, "/categories", Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }
}
