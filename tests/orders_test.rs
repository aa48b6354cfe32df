//! Order CRUD tests

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn seed_product_row(pool: &SqlitePool) -> i64 {
    let type_id: i64 =
        sqlx::query_scalar("INSERT INTO product_types (name) VALUES ('Lunch') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();

    sqlx::query_scalar(
        "INSERT INTO products
            (name, blc, mass, rate, picture_url, price, compound, is_hidden,
             is_complex, product_type_id)
         VALUES ('Borscht', 10, 300, 5, '', 120.5, 'beets', FALSE, TRUE, ?1)
         RETURNING id",
    )
    .bind(type_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_order_crud_roundtrip() {
    let pool = setup_test_db().await;
    let class_id = seed_class(&pool, 5, "A").await;
    let admin = seed_admin(&pool).await;
    let student = seed_user(&pool, "kid@example.com", "user", class_id, "Petrov", "Petr").await;
    let product_id = seed_product_row(&pool).await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/orders",
            Some(&admin.token),
            Some(json!({
                "order_name": "lunch for Petrov",
                "user_id": student.id,
                "product_id": product_id,
                "created_at": "2025-09-01T12:00:00",
                "status_id": 1
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let order_id = created["id"].as_i64().unwrap();
    assert_eq!(created["status_id"], 1);

    // Listing is public
    let response = app
        .clone()
        .oneshot(request("GET", "/orders", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    // Only name and status are updatable
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/orders/{order_id}"),
            Some(&admin.token),
            Some(json!({"status_id": 2})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status_id"], 2);
    assert_eq!(updated["order_name"], "lunch for Petrov");

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/orders/{order_id}"),
            Some(&admin.token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", &format!("/orders/{order_id}"), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_mutations_require_admin() {
    let pool = setup_test_db().await;
    let class_id = seed_class(&pool, 5, "A").await;
    let student = seed_user(&pool, "kid@example.com", "user", class_id, "Petrov", "Petr").await;
    let product_id = seed_product_row(&pool).await;
    let app = test_app(pool);

    let response = app
        .oneshot(request(
            "POST",
            "/orders",
            Some(&student.token),
            Some(json!({
                "order_name": "sneaky order",
                "user_id": student.id,
                "product_id": product_id,
                "created_at": "2025-09-01T12:00:00",
                "status_id": 1
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
