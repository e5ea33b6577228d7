use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    auth::jwt::JwtKeys,
    config::{AppConfig, defaults},
    services::{ServiceContext, auth_service::AuthService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection, jwt: JwtKeys) -> Arc<Self> {
        Arc::new(Self { config, db, jwt })
    }

    pub fn session_ttl_secs(&self) -> u64 {
        self.config
            .auth
            .as_ref()
            .map(|auth| auth.session_ttl_secs)
            .unwrap_or(defaults::DEFAULT_SESSION_TTL_SECS as u64)
    }

    pub fn services(&self) -> ServiceContext {
        ServiceContext::from_state(self)
    }

    pub fn auth(&self) -> AuthService<'_> {
        self.services().auth(&self.jwt, self.session_ttl_secs())
    }
}
