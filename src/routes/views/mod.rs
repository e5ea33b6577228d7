pub mod activities;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod flash;
pub mod render;
mod router;

pub use render::{Layout, PageError};
pub use router::router;
