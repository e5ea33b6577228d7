pub mod jwt;
pub mod password;
pub mod session;
mod types;

pub use types::{AdminRole, Claims, RequiredRole, Role, UserRole};
