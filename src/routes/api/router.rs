use std::sync::Arc;

use axum::Router;

use crate::{error::AppError, state::AppState};

use super::{admin, protected};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(protected::router(state.clone()))
        .merge(admin::router(state))
        .fallback(api_not_found)
}

async fn api_not_found() -> AppError {
    AppError::not_found("Route not found")
}
