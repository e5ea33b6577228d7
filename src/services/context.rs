use sea_orm::DatabaseConnection;

use crate::{
    auth::jwt::JwtKeys,
    db::dao::DaoContext,
    services::{
        activity_service::ActivityService, auth_service::AuthService,
        category_service::CategoryService, user_service::UserService,
    },
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user())
    }

    pub fn category(&self) -> CategoryService {
        CategoryService::new(self.daos.category(), self.daos.activity())
    }

    pub fn activity(&self) -> ActivityService {
        ActivityService::new(
            self.daos.activity(),
            self.daos.category(),
            self.daos.user(),
        )
    }

    pub fn auth<'a>(&self, jwt: &'a JwtKeys, session_ttl_secs: u64) -> AuthService<'a> {
        AuthService::new(self.user(), jwt, session_ttl_secs)
    }
}
