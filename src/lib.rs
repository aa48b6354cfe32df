pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod middleware;
pub mod observability;
pub mod routes;

pub use db::create_pool;
pub use error::{AppError, AppResult};
pub use routes::AppState;
