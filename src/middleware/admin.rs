//! Admin authorization middleware

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::auth::CurrentUser;
use crate::error::AppError;

/// Gate a route on the `admin` role. Must run after [`super::auth_middleware`],
/// which provides the [`CurrentUser`] extension.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, Response> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or_else(|| {
            tracing::warn!("Admin middleware reached without authenticated user");
            AppError::Unauthorized.into_response()
        })?;

    if !user.is_admin() {
        tracing::warn!(user_id = user.id, "Non-admin user attempted admin route");
        return Err(AppError::Forbidden("Admin only").into_response());
    }

    Ok(next.run(request).await)
}
