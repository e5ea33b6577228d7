use std::sync::Arc;

use axum::{Router, middleware};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::{
    auth::{
        Role,
        jwt::{JwtKeys, encode_token, make_session_claims},
        session::SESSION_COOKIE,
    },
    config::{AppConfig, AuthConfig},
    routes::{catch_panic_layer, json_error_middleware, router},
    state::AppState,
};

pub fn test_auth_config(secret: &[u8]) -> AuthConfig {
    AuthConfig {
        jwt_secret: String::from_utf8_lossy(secret).into_owned(),
        admin_username: "admin".to_string(),
        admin_email: "admin@example.com".to_string(),
        admin_password: "adminpassword".to_string(),
        session_ttl_secs: 3600,
    }
}

pub fn test_state(secret: &[u8], db: DatabaseConnection) -> Arc<AppState> {
    let cfg = AppConfig {
        auth: Some(test_auth_config(secret)),
        ..AppConfig::default()
    };
    AppState::new(cfg, db, JwtKeys::from_secret(secret))
}

/// The full application over an empty mock database.
pub fn test_router(secret: &[u8]) -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    app(test_state(secret, db))
}

pub fn app(state: Arc<AppState>) -> Router {
    router(state)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}

pub fn token_for(secret: &[u8], user_id: i32, username: &str, roles: Vec<Role>) -> String {
    let claims = make_session_claims(user_id, username, roles, 3600);
    encode_token(&JwtKeys::from_secret(secret), &claims).expect("encode token")
}

pub fn session_cookie_header(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}")
}
