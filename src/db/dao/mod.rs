pub mod activity_dao;
pub mod base;
pub mod base_traits;
pub mod category_dao;
mod context;
pub mod error;
pub mod user_dao;

pub use activity_dao::ActivityDao;
pub use base::{DaoBase, DaoPager, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, TimestampedActiveModel};
pub use category_dao::CategoryDao;
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use user_dao::UserDao;
