use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::AppError, routes::middleware::SessionUser};

use super::flash;

/// Navigation and flash data every page template carries.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub is_authenticated: bool,
    pub username: String,
    pub is_admin: bool,
    pub messages: Vec<String>,
}

impl Layout {
    pub fn for_user(user: &SessionUser, messages: Vec<String>) -> Self {
        Self {
            is_authenticated: true,
            username: user.username.clone(),
            is_admin: user.is_admin,
            messages,
        }
    }

    pub fn anonymous(messages: Vec<String>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

/// One `<option>` of a select box.
#[derive(Debug, Clone)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        let selected = value == current;
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

/// Pops pending flash messages off the jar.
pub fn take_messages(jar: CookieJar) -> (CookieJar, Vec<String>) {
    flash::take(jar)
}

pub fn render_html<T: Template>(template: &T) -> Result<Html<String>, PageError> {
    template
        .render()
        .map(Html)
        .map_err(|err| PageError(AppError::internal_with_source("Failed to render page", err)))
}

/// Renders `template` with `status`, returning the jar so consumed flash
/// cookies are cleared.
pub fn page<T: Template>(jar: CookieJar, status: StatusCode, template: &T) -> Result<Response, PageError> {
    let html = render_html(template)?;
    Ok((status, jar, html).into_response())
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    layout: Layout,
    status: u16,
    title: String,
    message: String,
}

/// Error of an HTML handler, rendered as an error page.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = match &self.0 {
            AppError::NotFound(_) => "The page you were looking for does not exist.".to_string(),
            AppError::Internal(_) => "Something went wrong on our side.".to_string(),
            other => other.message().to_string(),
        };
        let template = ErrorTemplate {
            layout: Layout::default(),
            status: status.as_u16(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };
        match template.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!("failed to render error page: {err}");
                (status, Html(template.message)).into_response()
            }
        }
    }
}

/// Ids in paths that are not positive integers name no resource.
pub fn parse_id(raw: &str) -> Result<i32, PageError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| PageError(AppError::not_found("Page not found")))
}

pub fn display_datetime(value: &chrono::DateTime<chrono::FixedOffset>) -> String {
    value
        .with_timezone(&chrono::Utc)
        .format("%b %d, %Y %H:%M")
        .to_string()
}

pub async fn not_found() -> PageError {
    PageError(AppError::not_found("Page not found"))
}
