pub mod activity_filter;
pub mod activity_service;
pub mod auth_service;
pub mod category_service;
pub mod context;
pub mod pagination;
pub mod stats;
pub mod user_service;

pub use context::ServiceContext;
