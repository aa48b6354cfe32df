mod admin;
mod auth;

pub use admin::admin_middleware;
pub use auth::{CurrentUser, auth_middleware};
