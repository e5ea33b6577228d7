use std::sync::Arc;

use askama::Template;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::{routes::middleware::SessionUser, state::AppState};

use super::{
    activities::{ActivityView, categories_by_id},
    render::{Layout, PageError, page, take_messages},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/dashboard/", get(dashboard))
        .with_state(state)
}

struct CategoryStat {
    name: String,
    color: String,
    count: i64,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    layout: Layout,
    total_activities: u64,
    completed_activities: u64,
    in_progress: u64,
    overdue: u64,
    completion_percent: i64,
    recent_activities: Vec<ActivityView>,
    category_stats: Vec<CategoryStat>,
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let now = Utc::now().fixed_offset();
    let services = state.services();
    let stats = services.activity().dashboard(user.id, now).await?;
    let lookup = categories_by_id(
        stats
            .by_category
            .iter()
            .map(|entry| entry.category.clone())
            .collect(),
    );

    let (jar, messages) = take_messages(jar);
    let template = DashboardTemplate {
        layout: Layout::for_user(&user, messages),
        total_activities: stats.total,
        completed_activities: stats.completed,
        in_progress: stats.in_progress,
        overdue: stats.overdue,
        completion_percent: stats.completion_percent,
        recent_activities: stats
            .recent
            .iter()
            .map(|model| ActivityView::new(model, &lookup, now))
            .collect(),
        category_stats: stats
            .by_category
            .into_iter()
            .map(|entry| CategoryStat {
                name: entry.category.name,
                color: entry.category.color,
                count: entry.count,
            })
            .collect(),
    };
    page(jar, StatusCode::OK, &template)
}
