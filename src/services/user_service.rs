use std::collections::HashMap;

use crate::{
    db::dao::{DaoBase, DaoLayerError, UserDao},
    db::entities::user,
    error::AppError,
};

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
}

impl UserService {
    pub fn new(user_dao: UserDao) -> Self {
        Self { user_dao }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, AppError> {
        match self.user_dao.find_by_id(id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_username(username).await?)
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<user::Model, AppError> {
        Ok(self
            .user_dao
            .create_user(username, email, password_hash, role)
            .await?)
    }

    pub async fn set_last_login(
        &self,
        user_id: i32,
        last_login: &chrono::DateTime<chrono::FixedOffset>,
    ) -> Result<(), AppError> {
        Ok(self.user_dao.set_last_login(user_id, last_login).await?)
    }

    pub async fn usernames_by_id(&self, ids: &[i32]) -> Result<HashMap<i32, String>, AppError> {
        Ok(self.user_dao.usernames_by_id(ids).await?)
    }
}
