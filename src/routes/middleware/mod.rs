mod guards;
mod json_error;
mod panic;

pub use guards::{AuthGuard, AuthRoleGuard, LoginRedirect, SessionUser, is_local_path, login_url};
pub use json_error::json_error_middleware;
pub use panic::catch_panic_layer;

pub use crate::auth::{AdminRole, RequiredRole, UserRole};
