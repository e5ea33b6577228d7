use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use crate::{
    auth::Role,
    error::AppError,
    routes::{
        middleware::AuthGuard,
        response::{ApiResult, JsonApiResponse},
    },
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().route("/me", get(me)).with_state(state)
}

#[derive(Debug, Serialize)]
struct Me {
    id: i32,
    username: String,
    email: String,
    role: String,
    roles: Vec<Role>,
    iat: usize,
    exp: usize,
}

async fn me(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<Me> {
    let user = match claims.user_id() {
        Some(id) => state.services().user().find_by_id(id).await?,
        None => None,
    };
    // Tokens outlive deleted accounts.
    let user = user.ok_or_else(|| AppError::unauthorized("Unknown user"))?;

    JsonApiResponse::ok(Me {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        roles: claims.roles,
        iat: claims.iat,
        exp: claims.exp,
    })
}
