use std::sync::Arc;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::AppError,
    forms::{CategoryForm, FormErrors},
    routes::middleware::SessionUser,
    state::AppState,
};

use super::{
    flash::{self, Flash},
    render::{Layout, PageError, page, parse_id, take_messages},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/categories/", get(list))
        .route("/categories/create/", get(create_form).post(create))
        .route("/categories/{id}/delete/", post(delete))
        .with_state(state)
}

struct CategoryRow {
    id: i32,
    name: String,
    description: String,
    color: String,
    activity_count: i64,
}

#[derive(Template)]
#[template(path = "category_list.html")]
struct CategoryListTemplate {
    layout: Layout,
    categories: Vec<CategoryRow>,
    can_delete: bool,
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let categories = state
        .services()
        .category()
        .list_with_counts(Some(user.id))
        .await?;

    let (jar, messages) = take_messages(jar);
    let template = CategoryListTemplate {
        layout: Layout::for_user(&user, messages),
        can_delete: user.is_admin,
        categories: categories
            .into_iter()
            .map(|entry| CategoryRow {
                id: entry.category.id,
                name: entry.category.name,
                description: entry.category.description,
                color: entry.category.color,
                activity_count: entry.count,
            })
            .collect(),
    };
    page(jar, StatusCode::OK, &template)
}

#[derive(Template)]
#[template(path = "category_form.html")]
struct CategoryFormTemplate {
    layout: Layout,
    heading: String,
    form: CategoryForm,
    errors: FormErrors,
}

fn render_form(
    user: &SessionUser,
    jar: CookieJar,
    form: CategoryForm,
    errors: FormErrors,
    status: StatusCode,
) -> Result<Response, PageError> {
    let (jar, messages) = take_messages(jar);
    let template = CategoryFormTemplate {
        layout: Layout::for_user(user, messages),
        heading: "Create Category".to_string(),
        form,
        errors,
    };
    page(jar, status, &template)
}

async fn create_form(user: SessionUser, jar: CookieJar) -> Result<Response, PageError> {
    render_form(
        &user,
        jar,
        CategoryForm::initial(),
        FormErrors::default(),
        StatusCode::OK,
    )
}

async fn create(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
    Form(form): Form<CategoryForm>,
) -> Result<Response, PageError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&user, jar, form, errors, StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    match state.services().category().create(&input).await {
        Ok(_) => {
            let jar = flash::push(jar, Flash::CategoryCreated);
            Ok((jar, Redirect::to("/categories/")).into_response())
        }
        Err(AppError::Conflict(message)) => {
            let mut errors = FormErrors::default();
            errors.add("name", message);
            render_form(&user, jar, form, errors, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(err) => Err(err.into()),
    }
}

async fn delete(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    if !user.is_admin {
        return Err(AppError::forbidden("Only administrators can delete categories.").into());
    }
    let id = parse_id(&id)?;
    state.services().category().delete(id).await?;
    let jar = flash::push(jar, Flash::CategoryDeleted);
    Ok((jar, Redirect::to("/categories/")).into_response())
}
