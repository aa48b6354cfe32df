//! User management from the command line.
//!
//! Registration over HTTP is admin-gated, so the first admin account has to
//! come from here.

use chrono::Local;
use clap::ValueEnum;

use crate::auth::hash_password;
use crate::config::Config;

/// The seeded "unassigned" class that staff accounts live in.
const UNASSIGNED_CLASS_ID: i64 = canteen_week::UNASSIGNED_CLASS_ID;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

async fn role_id(pool: &sqlx::SqlitePool, role: Role) -> anyhow::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users_roles WHERE name = ?1")
        .bind(role.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("role {} is not seeded, run migrations", role.as_str()))
}

pub async fn create(
    config: Config,
    email: String,
    password: String,
    role: Role,
    name: Option<String>,
    lastname: Option<String>,
) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(&config.database.url, 1).await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;
    if exists.is_some() {
        tracing::error!("user {email} already exists");
        return Ok(());
    }

    let role_id = role_id(&pool, role).await?;
    let password_hash = hash_password(&password)?;

    sqlx::query(
        "INSERT INTO users
            (name, lastname, patronymic, age, class_id, phone_number, email,
             created_at, avatar_url, user_rate, role_id, is_complex, password_hash)
         VALUES (?1, ?2, '', 0, ?3, '', ?4, ?5, '', 0, ?6, FALSE, ?7)",
    )
    .bind(&name)
    .bind(&lastname)
    .bind(UNASSIGNED_CLASS_ID)
    .bind(&email)
    .bind(Local::now().date_naive())
    .bind(role_id)
    .bind(&password_hash)
    .execute(&pool)
    .await?;

    tracing::info!("{email} created with {} role", role.as_str());

    Ok(())
}

pub async fn set_role(config: Config, email: String, role: Role) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(&config.database.url, 1).await?;

    let Some(user_id) = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?
    else {
        tracing::error!("user {email} not found");
        return Ok(());
    };

    let role_id = role_id(&pool, role).await?;

    sqlx::query("UPDATE users SET role_id = ?1 WHERE id = ?2")
        .bind(role_id)
        .bind(user_id)
        .execute(&pool)
        .await?;

    tracing::info!("{email} now has the {} role", role.as_str());

    Ok(())
}
