#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use canteen::config::{Config, DatabaseConfig, ExportConfig, JwtConfig, LogConfig, ServerConfig};
use canteen::routes::{AppState, router};

pub const TEST_JWT_SECRET: &str = "test_secret_key_minimum_32_characters_long";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();

    sqlx::query("PRAGMA foreign_keys = true")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    pool
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiration_minutes: 60,
        },
        export: ExportConfig::default(),
        log: LogConfig::default(),
    }
}

pub fn test_app(pool: SqlitePool) -> Router {
    router(AppState {
        config: test_config(),
        pool,
    })
}

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

pub async fn seed_class(pool: &SqlitePool, number: i64, letter: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO classes (number, letter, year, is_active, class_rate)
         VALUES (?1, ?2, 2025, TRUE, 0) RETURNING id",
    )
    .bind(number)
    .bind(letter)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_user(
    pool: &SqlitePool,
    email: &str,
    role: &str,
    class_id: i64,
    lastname: &str,
    name: &str,
) -> TestUser {
    let role_id: i64 = sqlx::query_scalar("SELECT id FROM users_roles WHERE name = ?1")
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap();

    let password_hash = canteen::auth::hash_password(TEST_PASSWORD).unwrap();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users
            (name, lastname, patronymic, age, class_id, phone_number, email,
             created_at, avatar_url, user_rate, role_id, is_complex, password_hash)
         VALUES (?1, ?2, 'Testovich', 12, ?3, '000', ?4, '2025-09-01', '', 0, ?5, FALSE, ?6)
         RETURNING id",
    )
    .bind(name)
    .bind(lastname)
    .bind(class_id)
    .bind(email)
    .bind(role_id)
    .bind(&password_hash)
    .fetch_one(pool)
    .await
    .unwrap();

    let token =
        canteen::auth::generate_token(id, role == "admin", TEST_JWT_SECRET, 3600).unwrap();

    TestUser { id, token }
}

pub async fn seed_admin(pool: &SqlitePool) -> TestUser {
    // Staff accounts live in the seeded "unassigned" class.
    seed_user(pool, "admin@example.com", "admin", 1, "Admin", "Root").await
}

pub async fn seed_complex(
    pool: &SqlitePool,
    name: &str,
    weekday_ids: &[i64],
    is_closed: bool,
) -> i64 {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO complexes (name, creation_date, is_closed)
         VALUES (?1, '2025-09-01', ?2) RETURNING id",
    )
    .bind(name)
    .bind(is_closed)
    .fetch_one(pool)
    .await
    .unwrap();

    for weekday_id in weekday_ids {
        sqlx::query("INSERT INTO complex_weekdays (complex_id, weekday_id) VALUES (?1, ?2)")
            .bind(id)
            .bind(weekday_id)
            .execute(pool)
            .await
            .unwrap();
    }

    id
}

pub async fn seed_choice(
    pool: &SqlitePool,
    user_id: i64,
    weekday_id: i64,
    week_start: &str,
    complex_id: i64,
) {
    sqlx::query(
        "INSERT INTO user_complex_choices (user_id, weekday_id, week_start, complex_id)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(user_id)
    .bind(weekday_id)
    .bind(week_start)
    .bind(complex_id)
    .execute(pool)
    .await
    .unwrap();
}

pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
