pub mod api;
mod entry;
pub mod middleware;
pub mod response;
pub mod views;

pub use entry::{API_PREFIX, router};
pub use middleware::{
    AdminRole, AuthGuard, AuthRoleGuard, RequiredRole, UserRole, catch_panic_layer,
    json_error_middleware,
};
pub use response::{ApiResult, JsonApiResponse};
