pub mod admin;
pub mod protected;
mod router;

pub use router::router;
