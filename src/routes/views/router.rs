use std::{path::PathBuf, sync::Arc};

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

use super::{activities, auth, categories, dashboard, render};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::router(state.clone()))
        .merge(dashboard::router(state.clone()))
        .merge(activities::router(state.clone()))
        .merge(categories::router(state))
        .nest_service("/static", ServeDir::new(resolve_static_dir()))
        .fallback(render::not_found)
}

fn resolve_static_dir() -> PathBuf {
    if let Some(path) = std::env::var_os("APP_STATIC_DIR") {
        return PathBuf::from(path);
    }

    if let Ok(current_dir) = std::env::current_dir() {
        let candidate = current_dir.join("static");
        if candidate.exists() {
            return candidate;
        }
    }

    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("static")
}
