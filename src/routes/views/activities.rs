use std::{collections::HashMap, sync::Arc};

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, FixedOffset, Utc};

use crate::{
    db::entities::{
        activity::{self, ActivityStatus, Priority},
        category,
    },
    error::AppError,
    forms::{ActivityForm, FormErrors},
    routes::middleware::SessionUser,
    services::{
        activity_filter::{ActivityFilter, ActivityQuery},
        pagination::Page,
    },
    state::AppState,
};

use super::{
    flash::{self, Flash},
    render::{Choice, Layout, PageError, display_datetime, page, parse_id, take_messages},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/activities/", get(list))
        .route("/activities/create/", get(create_form).post(create))
        .route("/activities/{id}/", get(detail))
        .route("/activities/{id}/update/", get(update_form).post(update))
        .route("/activities/{id}/delete/", get(confirm_delete).post(delete))
        .with_state(state)
}

/// Display-ready activity.
#[derive(Debug, Clone)]
pub struct ActivityView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub notes: String,
    pub category_name: String,
    pub category_color: String,
    pub priority: &'static str,
    pub priority_label: &'static str,
    pub status: &'static str,
    pub status_label: &'static str,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
    pub is_overdue: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ActivityView {
    pub fn new(
        model: &activity::Model,
        categories: &HashMap<i32, category::Model>,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let category = categories.get(&model.category_id);
        Self {
            id: model.id,
            title: model.title.clone(),
            description: model.description.clone(),
            notes: model.notes.clone(),
            category_name: category.map(|c| c.name.clone()).unwrap_or_default(),
            category_color: category
                .map(|c| c.color.clone())
                .unwrap_or_else(|| category::DEFAULT_COLOR.to_string()),
            priority: model.priority.as_str(),
            priority_label: model.priority.label(),
            status: model.status.as_str(),
            status_label: model.status.label(),
            start_date: display_datetime(&model.start_date),
            end_date: model.end_date.as_ref().map(display_datetime).unwrap_or_default(),
            duration: model
                .duration_minutes
                .map(|minutes| format!("{minutes} min"))
                .unwrap_or_default(),
            is_overdue: model.is_overdue(now),
            created_at: display_datetime(&model.created_at),
            updated_at: display_datetime(&model.updated_at),
        }
    }
}

pub fn categories_by_id(categories: Vec<category::Model>) -> HashMap<i32, category::Model> {
    categories
        .into_iter()
        .map(|category| (category.id, category))
        .collect()
}

/// Pager links that keep the active filters.
#[derive(Debug, Clone)]
pub struct PageNav {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub first_url: String,
    pub previous_url: String,
    pub next_url: String,
    pub last_url: String,
}

impl PageNav {
    fn new<T>(page: &Page<T>, query: &ActivityQuery) -> Self {
        let url = |number: u64| page_url(query, number);
        Self {
            number: page.number,
            num_pages: page.num_pages,
            total: page.total,
            has_previous: page.has_previous,
            has_next: page.has_next,
            first_url: url(1),
            previous_url: url(page.number.saturating_sub(1).max(1)),
            next_url: url(page.number + 1),
            last_url: url(page.num_pages),
        }
    }
}

fn page_url(query: &ActivityQuery, number: u64) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    for (key, value) in [
        ("category", &query.category),
        ("status", &query.status),
        ("priority", &query.priority),
        ("search", &query.search),
    ] {
        if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
            pairs.push((key, value.to_string()));
        }
    }
    pairs.push(("page", number.to_string()));
    let encoded = serde_urlencoded::to_string(&pairs).unwrap_or_default();
    format!("/activities/?{encoded}")
}

fn category_choices(categories: &[category::Model], current: &str) -> Vec<Choice> {
    categories
        .iter()
        .map(|category| Choice::new(category.id.to_string(), category.name.clone(), current))
        .collect()
}

fn priority_choices(current: &str) -> Vec<Choice> {
    Priority::ALL
        .iter()
        .map(|priority| Choice::new(priority.as_str(), priority.label(), current))
        .collect()
}

fn status_choices(current: &str) -> Vec<Choice> {
    ActivityStatus::ALL
        .iter()
        .map(|status| Choice::new(status.as_str(), status.label(), current))
        .collect()
}

#[derive(Template)]
#[template(path = "activity_list.html")]
struct ActivityListTemplate {
    layout: Layout,
    activities: Vec<ActivityView>,
    categories: Vec<Choice>,
    statuses: Vec<Choice>,
    priorities: Vec<Choice>,
    search_query: String,
    has_filters: bool,
    page: PageNav,
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
    Query(query): Query<ActivityQuery>,
) -> Result<Response, PageError> {
    let services = state.services();
    let filter = ActivityFilter::from_query(&query);
    let activities = services
        .activity()
        .list(user.id, &filter, query.page.as_deref())
        .await?;
    let categories = services.category().list_all().await?;

    let now = Utc::now().fixed_offset();
    let nav = PageNav::new(&activities, &query);
    let current_category = query.category.clone().unwrap_or_default();
    let current_status = query.status.clone().unwrap_or_default();
    let current_priority = query.priority.clone().unwrap_or_default();
    let category_options = category_choices(&categories, &current_category);
    let lookup = categories_by_id(categories);

    let (jar, messages) = take_messages(jar);
    let template = ActivityListTemplate {
        layout: Layout::for_user(&user, messages),
        activities: activities
            .items
            .iter()
            .map(|model| ActivityView::new(model, &lookup, now))
            .collect(),
        categories: category_options,
        statuses: status_choices(&current_status),
        priorities: priority_choices(&current_priority),
        search_query: query.search.clone().unwrap_or_default(),
        has_filters: !filter.is_empty(),
        page: nav,
    };
    page(jar, StatusCode::OK, &template)
}

#[derive(Template)]
#[template(path = "activity_detail.html")]
struct ActivityDetailTemplate {
    layout: Layout,
    activity: ActivityView,
}

async fn detail(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let id = parse_id(&id)?;
    let services = state.services();
    let model = services.activity().get(user.id, id).await?;
    let lookup = categories_by_id(services.category().list_all().await?);

    let (jar, messages) = take_messages(jar);
    let template = ActivityDetailTemplate {
        layout: Layout::for_user(&user, messages),
        activity: ActivityView::new(&model, &lookup, Utc::now().fixed_offset()),
    };
    page(jar, StatusCode::OK, &template)
}

#[derive(Template)]
#[template(path = "activity_form.html")]
struct ActivityFormTemplate {
    layout: Layout,
    heading: String,
    action: String,
    cancel_url: String,
    form: ActivityForm,
    errors: FormErrors,
    categories: Vec<Choice>,
    priorities: Vec<Choice>,
    statuses: Vec<Choice>,
}

enum FormMode {
    Create,
    Update(i32),
}

impl FormMode {
    fn heading(&self) -> &'static str {
        match self {
            FormMode::Create => "Create Activity",
            FormMode::Update(_) => "Update Activity",
        }
    }

    fn action(&self) -> String {
        match self {
            FormMode::Create => "/activities/create/".to_string(),
            FormMode::Update(id) => format!("/activities/{id}/update/"),
        }
    }

    fn cancel_url(&self) -> String {
        match self {
            FormMode::Create => "/activities/".to_string(),
            FormMode::Update(id) => format!("/activities/{id}/"),
        }
    }
}

async fn render_form(
    state: &AppState,
    user: &SessionUser,
    jar: CookieJar,
    mode: FormMode,
    form: ActivityForm,
    errors: FormErrors,
    status: StatusCode,
) -> Result<Response, PageError> {
    let categories = state.services().category().list_all().await?;
    let (jar, messages) = take_messages(jar);
    let template = ActivityFormTemplate {
        layout: Layout::for_user(user, messages),
        heading: mode.heading().to_string(),
        action: mode.action(),
        cancel_url: mode.cancel_url(),
        categories: category_choices(&categories, &form.category),
        priorities: priority_choices(&form.priority),
        statuses: status_choices(&form.status),
        form,
        errors,
    };
    page(jar, status, &template)
}

/// Category problems found by the service belong to the category field.
fn category_errors(err: AppError) -> Result<FormErrors, PageError> {
    match err {
        AppError::Validation(message) => {
            let mut errors = FormErrors::default();
            errors.add("category", message);
            Ok(errors)
        }
        other => Err(other.into()),
    }
}

async fn create_form(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let form = ActivityForm::initial(&Utc::now().fixed_offset());
    render_form(
        &state,
        &user,
        jar,
        FormMode::Create,
        form,
        FormErrors::default(),
        StatusCode::OK,
    )
    .await
}

async fn create(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
    Form(form): Form<ActivityForm>,
) -> Result<Response, PageError> {
    let input = match form.validate(Utc::now().fixed_offset()) {
        Ok(input) => input,
        Err(errors) => {
            return render_form(
                &state,
                &user,
                jar,
                FormMode::Create,
                form,
                errors,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await;
        }
    };

    match state.services().activity().create(user.id, input).await {
        Ok(model) => {
            let jar = flash::push(jar, Flash::ActivityCreated);
            Ok((jar, Redirect::to(&format!("/activities/{}/", model.id))).into_response())
        }
        Err(err) => {
            let errors = category_errors(err)?;
            render_form(
                &state,
                &user,
                jar,
                FormMode::Create,
                form,
                errors,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await
        }
    }
}

async fn update_form(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let id = parse_id(&id)?;
    let model = state.services().activity().get(user.id, id).await?;
    let form = ActivityForm::from_model(&model);
    render_form(
        &state,
        &user,
        jar,
        FormMode::Update(id),
        form,
        FormErrors::default(),
        StatusCode::OK,
    )
    .await
}

async fn update(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<ActivityForm>,
) -> Result<Response, PageError> {
    let id = parse_id(&id)?;
    let activities = state.services().activity();
    // Foreign or missing activities are a 404 before any validation feedback.
    activities.get(user.id, id).await?;

    let input = match form.validate(Utc::now().fixed_offset()) {
        Ok(input) => input,
        Err(errors) => {
            return render_form(
                &state,
                &user,
                jar,
                FormMode::Update(id),
                form,
                errors,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await;
        }
    };

    match activities.update(user.id, id, input).await {
        Ok(model) => {
            let jar = flash::push(jar, Flash::ActivityUpdated);
            Ok((jar, Redirect::to(&format!("/activities/{}/", model.id))).into_response())
        }
        Err(err) => {
            let errors = category_errors(err)?;
            render_form(
                &state,
                &user,
                jar,
                FormMode::Update(id),
                form,
                errors,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await
        }
    }
}

#[derive(Template)]
#[template(path = "activity_confirm_delete.html")]
struct ActivityConfirmDeleteTemplate {
    layout: Layout,
    activity: ActivityView,
}

async fn confirm_delete(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let id = parse_id(&id)?;
    let services = state.services();
    let model = services.activity().get(user.id, id).await?;
    let lookup = categories_by_id(services.category().list_all().await?);

    let (jar, messages) = take_messages(jar);
    let template = ActivityConfirmDeleteTemplate {
        layout: Layout::for_user(&user, messages),
        activity: ActivityView::new(&model, &lookup, Utc::now().fixed_offset()),
    };
    page(jar, StatusCode::OK, &template)
}

async fn delete(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let id = parse_id(&id)?;
    state.services().activity().delete(user.id, id).await?;
    let jar = flash::push(jar, Flash::ActivityDeleted);
    Ok((jar, Redirect::to("/activities/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::{ActivityQuery, page_url};

    #[test]
    fn page_links_keep_filters() {
        let query = ActivityQuery {
            category: Some("2".to_string()),
            status: Some(String::new()),
            search: Some("run fast".to_string()),
            ..Default::default()
        };
        assert_eq!(
            page_url(&query, 3),
            "/activities/?category=2&search=run+fast&page=3"
        );
    }
}
