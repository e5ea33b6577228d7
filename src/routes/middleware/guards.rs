use std::{convert::Infallible, marker::PhantomData, sync::Arc};

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::{Claims, RequiredRole, jwt::decode_token, session::SESSION_COOKIE},
    error::AppError,
    state::AppState,
};

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn session_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

// Auth guard: a Bearer token or the session cookie, validated as a JWT.
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(claims);
        }

        let token = match bearer_token(parts) {
            Some(token) => token.to_string(),
            None => session_token(parts)
                .ok_or_else(|| AppError::unauthorized("Missing/invalid Authorization header"))?,
        };

        let claims = decode_token(&state.jwt, &token)?;
        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

pub type AuthGuard = Claims;

pub struct AuthRoleGuard<R: RequiredRole> {
    pub claims: Claims,
    _marker: PhantomData<R>,
}

impl<R> FromRequestParts<Arc<AppState>> for AuthRoleGuard<R>
where
    R: RequiredRole,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;

        if !claims.roles.iter().any(|role| role == &R::required()) {
            return Err(AppError::forbidden("Missing required role"));
        }

        Ok(Self {
            claims,
            _marker: PhantomData,
        })
    }
}

/// The signed-in user of an HTML page. Pages extracting it send anonymous
/// visitors to the login page instead of failing.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

impl SessionUser {
    fn from_claims(claims: &Claims) -> Option<Self> {
        Some(Self {
            id: claims.user_id()?,
            username: claims.username.clone(),
            is_admin: claims.is_admin(),
        })
    }
}

/// Rejection of [`SessionUser`]: redirect to login, remembering the page.
#[derive(Debug)]
pub struct LoginRedirect(String);

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to(&login_url(Some(&self.0))).into_response()
    }
}

/// `/` with a `next` parameter when `next` is a local path.
pub fn login_url(next: Option<&str>) -> String {
    match next.filter(|path| is_local_path(path)) {
        Some(path) => match serde_urlencoded::to_string(&[("next", path)]) {
            Ok(query) => format!("/?{query}"),
            Err(_) => "/".to_string(),
        },
        None => "/".to_string(),
    }
}

/// Relative, same-site path (no scheme, no `//host`).
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let found = <SessionUser as OptionalFromRequestParts<Arc<AppState>>>::from_request_parts(
            parts, state,
        )
        .await;
        match found {
            Ok(Some(user)) => Ok(user),
            _ => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|value| value.as_str().to_string())
                    .unwrap_or_else(|| parts.uri.path().to_string());
                Err(LoginRedirect(next))
            }
        }
    }
}

impl OptionalFromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(token) = session_token(parts) else {
            return Ok(None);
        };
        match decode_token(&state.jwt, &token) {
            Ok(claims) => Ok(SessionUser::from_claims(&claims)),
            Err(err) => {
                tracing::debug!("ignoring session cookie: {err}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_local_path, login_url};

    #[test]
    fn login_url_keeps_only_local_next() {
        assert_eq!(login_url(None), "/");
        assert_eq!(login_url(Some("/activities/")), "/?next=%2Factivities%2F");
        assert_eq!(
            login_url(Some("/activities/?status=planned&page=2")),
            "/?next=%2Factivities%2F%3Fstatus%3Dplanned%26page%3D2"
        );
        assert_eq!(login_url(Some("https://evil.example")), "/");
        assert_eq!(login_url(Some("//evil.example")), "/");
    }

    #[test]
    fn local_paths() {
        assert!(is_local_path("/dashboard/"));
        assert!(!is_local_path("dashboard/"));
        assert!(!is_local_path("//host/path"));
        assert!(!is_local_path("/\\host"));
    }
}
