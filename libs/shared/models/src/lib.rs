pub mod auth;
pub mod error;

pub use auth::{Identity, JwtClaims, Role};
pub use error::AppError;
