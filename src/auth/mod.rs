pub mod jwt;
pub mod password;

pub use jwt::{AuthUser, Claims, generate_token, validate_token};
pub use password::{hash_password, verify_password};
