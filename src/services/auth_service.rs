use crate::{
    auth::{
        Claims, Role,
        jwt::{JwtKeys, decode_token, encode_token, make_session_claims},
        password::{hash_password, verify_password},
    },
    config::AuthConfig,
    db::entities::user,
    error::AppError,
    forms::RegisterInput,
    services::user_service::UserService,
};

pub const INVALID_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// A freshly issued session for `user`.
#[derive(Debug)]
pub struct Session {
    pub user: user::Model,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService<'a> {
    user_service: UserService,
    jwt: &'a JwtKeys,
    session_ttl_secs: u64,
}

impl<'a> AuthService<'a> {
    pub fn new(user_service: UserService, jwt: &'a JwtKeys, session_ttl_secs: u64) -> Self {
        Self {
            user_service,
            jwt,
            session_ttl_secs,
        }
    }

    pub fn issue_token(&self, user: &user::Model) -> Result<String, AppError> {
        let claims = make_session_claims(
            user.id,
            &user.username,
            Role::granted(&user.role),
            self.session_ttl_secs as usize,
        );
        encode_token(self.jwt, &claims)
    }

    pub async fn register(&self, input: &RegisterInput) -> Result<Session, AppError> {
        if self
            .user_service
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(USERNAME_TAKEN));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .user_service
            .create_user(
                &input.username,
                &input.email,
                &password_hash,
                Role::User.as_str(),
            )
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "registered user");

        let token = self.issue_token(&user)?;
        Ok(Session { user, token })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let user = self
            .user_service
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let now = chrono::Utc::now().fixed_offset();
        self.user_service.set_last_login(user.id, &now).await?;

        let token = self.issue_token(&user)?;
        Ok(Session { user, token })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode_token(self.jwt, token)
    }

    pub async fn seed_admin(&self, cfg: &AuthConfig) -> anyhow::Result<()> {
        if let Some(existing) = self
            .user_service
            .find_by_username(&cfg.admin_username)
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?
        {
            tracing::info!("admin user already present: {}", existing.username);
            return Ok(());
        }

        let hash = hash_password(&cfg.admin_password)
            .map_err(|e| anyhow::anyhow!("admin seed hash error: {e}"))?;
        let user = self
            .user_service
            .create_user(
                &cfg.admin_username,
                &cfg.admin_email,
                &hash,
                Role::Admin.as_str(),
            )
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?;
        tracing::info!("seeded admin user {}", user.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, IntoMockRow, MockDatabase};

    use crate::{
        auth::{Role, jwt::JwtKeys, password::hash_password},
        config::AuthConfig,
        db::entities::user,
        error::AppError,
        forms::RegisterInput,
        services::ServiceContext,
    };

    use super::{INVALID_CREDENTIALS, USERNAME_TAKEN};

    const TTL: u64 = 3600;

    fn ts() -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn user_model(id: i32, username: &str, password_hash: &str, role: &str) -> user::Model {
        user::Model {
            id,
            created_at: ts(),
            updated_at: ts(),
            username: username.to_string(),
            email: String::new(),
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            last_login_at: None,
        }
    }

    fn mock_with<T, I, II>(sets: II) -> sea_orm::DatabaseConnection
    where
        T: IntoMockRow,
        I: IntoIterator<Item = T>,
        II: IntoIterator<Item = I>,
    {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(sets)
            .into_connection()
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let db = mock_with([[user_model(1, "alice", "hash", "user")]]);
        let keys = JwtKeys::from_secret(b"auth-service-secret");
        let service = ServiceContext::new(&db).auth(&keys, TTL);

        let err = service
            .register(&RegisterInput {
                username: "alice".to_string(),
                email: String::new(),
                password: "password123".to_string(),
            })
            .await
            .expect_err("register should fail");
        assert!(matches!(err, AppError::Conflict(ref message) if message == USERNAME_TAKEN));
    }

    #[tokio::test]
    async fn register_creates_user_and_issues_token() {
        let created = user_model(2, "bob", "hash", "user");
        let db = mock_with([Vec::<user::Model>::new(), vec![created]]);
        let keys = JwtKeys::from_secret(b"auth-service-secret");
        let service = ServiceContext::new(&db).auth(&keys, TTL);

        let session = service
            .register(&RegisterInput {
                username: "bob".to_string(),
                email: String::new(),
                password: "password123".to_string(),
            })
            .await
            .expect("register should succeed");

        let claims = service.verify(&session.token).expect("token should verify");
        assert_eq!(claims.sub, "2");
        assert_eq!(claims.username, "bob");
        assert_eq!(claims.roles, vec![Role::User]);
    }

    #[tokio::test]
    async fn login_with_unknown_user_is_unauthorized() {
        let db = mock_with([Vec::<user::Model>::new()]);
        let keys = JwtKeys::from_secret(b"auth-service-secret");
        let service = ServiceContext::new(&db).auth(&keys, TTL);

        let err = service
            .login("ghost", "password123")
            .await
            .expect_err("login should fail");
        assert!(matches!(err, AppError::Unauthorized(ref message) if message == INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let hash = hash_password("password123").expect("hash should succeed");
        let db = mock_with([[user_model(1, "alice", &hash, "user")]]);
        let keys = JwtKeys::from_secret(b"auth-service-secret");
        let service = ServiceContext::new(&db).auth(&keys, TTL);

        let err = service
            .login("alice", "not-the-password")
            .await
            .expect_err("login should fail");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn admin_login_grants_both_roles() {
        let hash = hash_password("adminpassword").expect("hash should succeed");
        let admin = user_model(1, "admin", &hash, "admin");
        // lookup, last-login lookup, last-login update
        let db = mock_with([[admin.clone()], [admin.clone()], [admin]]);
        let keys = JwtKeys::from_secret(b"auth-service-secret");
        let service = ServiceContext::new(&db).auth(&keys, TTL);

        let session = service
            .login("admin", "adminpassword")
            .await
            .expect("login should succeed");
        let claims = service.verify(&session.token).expect("token should verify");
        assert_eq!(claims.roles, vec![Role::Admin, Role::User]);
        assert_eq!(claims.exp - claims.iat, TTL as usize);
    }

    #[tokio::test]
    async fn seed_admin_skips_existing_account() {
        let db = mock_with([[user_model(1, "admin", "hash", "admin")]]);
        let keys = JwtKeys::from_secret(b"auth-service-secret");
        let service = ServiceContext::new(&db).auth(&keys, TTL);

        service
            .seed_admin(&AuthConfig {
                jwt_secret: "secret".to_string(),
                admin_username: "admin".to_string(),
                admin_email: String::new(),
                admin_password: "adminpassword".to_string(),
                session_ttl_secs: TTL,
            })
            .await
            .expect("seed should succeed");

        drop(service);
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
