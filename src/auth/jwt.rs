use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{Claims, Role};
use crate::error::AppError;

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

pub fn now_unix() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as usize)
        .unwrap_or_default()
}

pub fn encode_token(keys: &JwtKeys, claims: &Claims) -> Result<String, AppError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, claims, &keys.enc)
        .map_err(|err| AppError::internal_with_source("Token encoding failed", err))
}

/// Validates signature and expiry.
pub fn decode_token(keys: &JwtKeys, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &keys.dec, &validation)?;
    Ok(data.claims)
}

pub fn make_session_claims(
    user_id: i32,
    username: &str,
    roles: Vec<Role>,
    ttl_secs: usize,
) -> Claims {
    let iat = now_unix();
    let exp = iat + ttl_secs;
    Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        roles,
        iat,
        exp,
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::unauthorized(format!("Invalid or expired token: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AppError;

    use super::{JwtKeys, Role, decode_token, encode_token, make_session_claims, now_unix};

    #[test]
    fn makes_claims_with_expected_subject_roles_and_ttl() {
        let claims = make_session_claims(7, "alice", vec![Role::User], 60);

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.roles, vec![Role::User]);
        assert_eq!(claims.exp.saturating_sub(claims.iat), 60);
    }

    #[test]
    fn encoded_token_decodes_with_same_secret() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let claims = make_session_claims(3, "admin", vec![Role::Admin, Role::User], 600);
        let token = encode_token(&keys, &claims).expect("token should encode");

        let decoded = decode_token(&keys, &token).expect("token should decode");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let claims = make_session_claims(3, "alice", vec![Role::User], 600);
        let token = encode_token(&JwtKeys::from_secret(b"secret-one"), &claims)
            .expect("token should encode");

        let err = decode_token(&JwtKeys::from_secret(b"secret-two"), &token)
            .expect_err("decode should fail");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let mut claims = make_session_claims(3, "alice", vec![Role::User], 0);
        claims.iat = now_unix() - 7200;
        claims.exp = now_unix() - 3600;
        let token = encode_token(&keys, &claims).expect("token should encode");

        let err = decode_token(&keys, &token).expect_err("decode should fail");
        assert!(
            err.message().starts_with("Invalid or expired token:"),
            "unexpected message: {}",
            err.message()
        );
    }
}
