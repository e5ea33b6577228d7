use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set};

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;
    const ENTITY_NAME: &'static str = "user";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    pub async fn find_by_username(&self, username: &str) -> DaoResult<Option<user::Model>> {
        let username = username.to_string();
        self.find(1, 1, Vec::new(), move |query| {
            query.filter(user::Column::Username.eq(username))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role.to_string()),
            last_login_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn set_last_login(
        &self,
        id: i32,
        at: &chrono::DateTime<chrono::FixedOffset>,
    ) -> DaoResult<()> {
        let at = *at;
        self.update(id, move |active| {
            active.last_login_at = Set(Some(at));
        })
        .await
        .map(|_| ())
    }

    /// Ids of users whose username contains `pattern` (a LIKE pattern).
    pub async fn ids_matching_username(&self, pattern: &str) -> DaoResult<Vec<i32>> {
        use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};

        User::find()
            .select_only()
            .column(user::Column::Id)
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            )
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn usernames_by_id(&self, ids: &[i32]) -> DaoResult<HashMap<i32, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = User::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(users.into_iter().map(|user| (user.id, user.username)).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::db::entities::user;

    use super::UserDao;
    use crate::db::dao::{DaoBase, DaoLayerError};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn user_model(id: i32, username: &str) -> user::Model {
        let now = ts();
        user::Model {
            id,
            created_at: now,
            updated_at: now,
            username: username.to_string(),
            email: String::new(),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
            last_login_at: None,
        }
    }

    #[tokio::test]
    async fn find_by_username_returns_first_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(1, "alice")]])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_username("alice")
            .await
            .expect("query should succeed");
        assert_eq!(result.map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn find_by_username_returns_none_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_username("missing")
            .await
            .expect("query should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn set_last_login_propagates_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let err = dao
            .set_last_login(42, &ts())
            .await
            .expect_err("update should fail");
        assert!(matches!(
            err,
            DaoLayerError::NotFound { id: 42, .. }
        ));
    }

    #[tokio::test]
    async fn usernames_by_id_skips_query_for_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dao = UserDao::new(&db);

        let names = dao.usernames_by_id(&[]).await.expect("lookup should succeed");
        assert!(names.is_empty());
    }
}
