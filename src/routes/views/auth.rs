use std::sync::Arc;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    auth::session::{expired_session_cookie, session_cookie},
    error::AppError,
    forms::{FormErrors, LoginForm, RegisterForm},
    routes::middleware::{SessionUser, is_local_path},
    state::AppState,
};

use super::{
    flash::{self, Flash},
    render::{Layout, PageError, page, take_messages},
};

const DASHBOARD: &str = "/dashboard/";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(login_page).post(login))
        .route("/register/", get(register_page).post(register))
        .route("/logout/", get(logout).post(logout))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NextQuery {
    next: Option<String>,
}

/// `next` when it is a local path, the dashboard otherwise.
fn redirect_target(next: &str) -> &str {
    if is_local_path(next) { next } else { DASHBOARD }
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    layout: Layout,
    username: String,
    next: String,
    errors: FormErrors,
}

fn render_login(
    jar: CookieJar,
    form: &LoginForm,
    errors: FormErrors,
    status: StatusCode,
) -> Result<Response, PageError> {
    let (jar, messages) = take_messages(jar);
    let template = LoginTemplate {
        layout: Layout::anonymous(messages),
        username: form.username.clone(),
        next: form.next.clone(),
        errors,
    };
    page(jar, status, &template)
}

async fn login_page(
    user: Option<SessionUser>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
) -> Result<Response, PageError> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD).into_response());
    }
    let form = LoginForm {
        next: query.next.unwrap_or_default(),
        ..Default::default()
    };
    render_login(jar, &form, FormErrors::default(), StatusCode::OK)
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let (username, password) = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => return render_login(jar, &form, errors, StatusCode::UNPROCESSABLE_ENTITY),
    };

    match state.auth().login(&username, &password).await {
        Ok(session) => {
            tracing::info!(user_id = session.user.id, "user logged in");
            let jar = jar.add(session_cookie(session.token, state.session_ttl_secs()));
            Ok((jar, Redirect::to(redirect_target(&form.next))).into_response())
        }
        Err(AppError::Unauthorized(message)) => {
            let mut errors = FormErrors::default();
            errors.add_non_field(message);
            render_login(jar, &form, errors, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    layout: Layout,
    username: String,
    email: String,
    errors: FormErrors,
}

fn render_register(
    jar: CookieJar,
    form: &RegisterForm,
    errors: FormErrors,
    status: StatusCode,
) -> Result<Response, PageError> {
    let (jar, messages) = take_messages(jar);
    let template = RegisterTemplate {
        layout: Layout::anonymous(messages),
        username: form.username.clone(),
        email: form.email.clone(),
        errors,
    };
    page(jar, status, &template)
}

async fn register_page(user: Option<SessionUser>, jar: CookieJar) -> Result<Response, PageError> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD).into_response());
    }
    render_register(jar, &RegisterForm::default(), FormErrors::default(), StatusCode::OK)
}

async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return render_register(jar, &form, errors, StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    match state.auth().register(&input).await {
        Ok(session) => {
            let jar = jar.add(session_cookie(session.token, state.session_ttl_secs()));
            let jar = flash::push(jar, Flash::Registered);
            Ok((jar, Redirect::to(DASHBOARD)).into_response())
        }
        Err(AppError::Conflict(message)) => {
            let mut errors = FormErrors::default();
            errors.add("username", message);
            render_register(jar, &form, errors, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(err) => Err(err.into()),
    }
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.add(expired_session_cookie()), Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::redirect_target;

    #[test]
    fn redirects_only_to_local_paths() {
        assert_eq!(redirect_target(""), "/dashboard/");
        assert_eq!(redirect_target("/activities/?page=2"), "/activities/?page=2");
        assert_eq!(redirect_target("https://evil.example/"), "/dashboard/");
        assert_eq!(redirect_target("//evil.example/"), "/dashboard/");
    }
}
