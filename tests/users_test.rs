//! User CRUD and permission tests

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_get_user_is_public() {
    let pool = setup_test_db().await;
    let class_id = seed_class(&pool, 5, "A").await;
    let student = seed_user(&pool, "kid@example.com", "user", class_id, "Petrov", "Petr").await;
    let app = test_app(pool);

    let response = app
        .oneshot(request("GET", &format!("/users/{}", student.id), None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "kid@example.com");
    assert_eq!(body["lastname"], "Petrov");
}

#[tokio::test]
async fn test_get_unknown_user_is_404() {
    let pool = setup_test_db().await;
    let app = test_app(pool);

    let response = app
        .oneshot(request("GET", "/users/9999", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_create_user_requires_admin() {
    let pool = setup_test_db().await;
    let class_id = seed_class(&pool, 5, "A").await;
    let student = seed_user(&pool, "kid@example.com", "user", class_id, "Petrov", "Petr").await;
    let app = test_app(pool);

    let payload = json!({
        "name": "Anna",
        "lastname": "Ivanova",
        "patronymic": "Ivanovna",
        "age": 11,
        "class_id": class_id,
        "phone_number": "222",
        "email": "anna@example.com",
        "created_at": "2025-09-01",
        "avatar_url": "",
        "user_rate": 0,
        "role_id": 2,
        "is_complex": true
    });

    let response = app
        .oneshot(request("POST", "/users", Some(&student.token), Some(payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_creates_lists_and_deletes_user() {
    let pool = setup_test_db().await;
    let class_id = seed_class(&pool, 5, "A").await;
    let admin = seed_admin(&pool).await;
    let app = test_app(pool);

    let payload = json!({
        "name": "Anna",
        "lastname": "Ivanova",
        "patronymic": "Ivanovna",
        "age": 11,
        "class_id": class_id,
        "phone_number": "222",
        "email": "anna@example.com",
        "created_at": "2025-09-01",
        "avatar_url": "",
        "user_rate": 0,
        "role_id": 2,
        "is_complex": true
    });

    let response = app
        .clone()
        .oneshot(request("POST", "/users", Some(&admin.token), Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let user_id = created["id"].as_i64().unwrap();
    assert_eq!(created["email"], "anna@example.com");

    let response = app
        .clone()
        .oneshot(request("GET", "/users", Some(&admin.token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert!(listed.as_array().unwrap().len() >= 2);

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/users/{user_id}"),
            Some(&admin.token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "deleted");

    let response = app
        .oneshot(request("GET", &format!("/users/{user_id}"), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_updates_self_but_not_others() {
    let pool = setup_test_db().await;
    let class_id = seed_class(&pool, 5, "A").await;
    let student = seed_user(&pool, "kid@example.com", "user", class_id, "Petrov", "Petr").await;
    let other = seed_user(&pool, "other@example.com", "user", class_id, "Sidorov", "Ivan").await;
    let app = test_app(pool);

    // Self-update is allowed
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/users/{}", student.id),
            Some(&student.token),
            Some(json!({"avatar_url": "https://cdn.example.com/a.png"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["avatar_url"], "https://cdn.example.com/a.png");
    // Untouched fields survive partial updates
    assert_eq!(body["lastname"], "Petrov");

    // Updating someone else is not
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/users/{}", other.id),
            Some(&student.token),
            Some(json!({"avatar_url": "x"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Without a token the route is unreachable
    let response = app
        .oneshot(request(
            "PUT",
            &format!("/users/{}", student.id),
            None,
            Some(json!({"avatar_url": "x"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_updates_any_user() {
    let pool = setup_test_db().await;
    let class_id = seed_class(&pool, 5, "A").await;
    let admin = seed_admin(&pool).await;
    let student = seed_user(&pool, "kid@example.com", "user", class_id, "Petrov", "Petr").await;
    let app = test_app(pool);

    let response = app
        .oneshot(request(
            "PUT",
            &format!("/users/{}", student.id),
            Some(&admin.token),
            Some(json!({"user_rate": 10})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_rate"], 10);
}
