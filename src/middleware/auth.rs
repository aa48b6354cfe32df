//! Authentication middleware: bearer token to database-backed user

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::prelude::FromRow;

use crate::auth::validate_token;
use crate::error::AppError;
use crate::routes::AppState;

/// Authenticated user loaded from the database, inserted as a request
/// extension by [`auth_middleware`].
#[derive(Clone, Debug, FromRow)]
pub struct CurrentUser {
    pub id: i64,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Validates the `Authorization: Bearer` token, re-checks that the subject
/// still exists (a deleted user keeps a valid token until it expires), and
/// inserts a [`CurrentUser`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        tracing::warn!("No bearer token found in request");
        return Err(AppError::Unauthorized.into_response());
    };

    let auth_user = match validate_token(token, &state.config.jwt.secret) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid or expired token");
            return Err(AppError::Unauthorized.into_response());
        }
    };

    let user = sqlx::query_as::<_, CurrentUser>(
        "SELECT users.id, users_roles.name AS role
         FROM users
         JOIN users_roles ON users_roles.id = users.role_id
         WHERE users.id = ?1",
    )
    .bind(auth_user.user_id)
    .fetch_optional(&state.pool)
    .await;

    match user {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        Ok(None) => {
            tracing::warn!(user_id = auth_user.user_id, "Token subject no longer exists");
            Err(AppError::Unauthorized.into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load user during authentication");
            Err(AppError::Unauthorized.into_response())
        }
    }
}
