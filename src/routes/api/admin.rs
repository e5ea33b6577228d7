use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        dao::{ActivityDao, DaoBase},
        entities::activity,
    },
    error::AppError,
    routes::{
        middleware::{AdminRole, AuthRoleGuard},
        response::{ApiResult, JsonApiResponse},
    },
    services::{
        activity_filter::{ActivityFilter, ActivityQuery},
        pagination::{ACTIVITY_PAGE_SIZE, Page},
    },
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/admin/activities", get(list_activities))
        .route("/admin/categories", get(list_categories))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct AdminActivity {
    #[serde(flatten)]
    activity: activity::Model,
    username: String,
    category_name: String,
    is_overdue: bool,
}

/// `page_size` falls back to the listing default; otherwise it must lie in
/// `1..=MAX_PAGE_SIZE`.
fn parse_page_size(raw: Option<&str>) -> Result<u64, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(ACTIVITY_PAGE_SIZE);
    };
    let max = <ActivityDao as DaoBase>::MAX_PAGE_SIZE;
    raw.parse::<u64>()
        .ok()
        .filter(|size| (1..=max).contains(size))
        .ok_or_else(|| AppError::bad_request(format!("page_size must be between 1 and {max}")))
}

async fn list_activities(
    State(state): State<Arc<AppState>>,
    AuthRoleGuard { claims, .. }: AuthRoleGuard<AdminRole>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Page<AdminActivity>> {
    let page_size = parse_page_size(query.page_size.as_deref())?;
    let filter = ActivityFilter::from_query(&query);
    let services = state.services();

    let page = services
        .activity()
        .list_all(&filter, query.page.as_deref(), page_size)
        .await?;

    let mut owner_ids: Vec<i32> = page.items.iter().map(|model| model.user_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();
    let usernames = services.user().usernames_by_id(&owner_ids).await?;
    let categories = services.category().list_all().await?;

    tracing::debug!(admin = %claims.sub, total = page.total, "admin activity listing");

    let now = chrono::Utc::now().fixed_offset();
    JsonApiResponse::ok(page.map(|model| {
        let category_name = categories
            .iter()
            .find(|category| category.id == model.category_id)
            .map(|category| category.name.clone())
            .unwrap_or_default();
        AdminActivity {
            username: usernames.get(&model.user_id).cloned().unwrap_or_default(),
            category_name,
            is_overdue: model.is_overdue(now),
            activity: model,
        }
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CategorySearch {
    search: Option<String>,
}

#[derive(Debug, Serialize)]
struct AdminCategory {
    id: i32,
    name: String,
    description: String,
    color: String,
    activity_count: i64,
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Query(query): Query<CategorySearch>,
) -> ApiResult<Vec<AdminCategory>> {
    let categories = state
        .services()
        .category()
        .search_with_counts(query.search.as_deref())
        .await?;

    JsonApiResponse::ok(
        categories
            .into_iter()
            .map(|entry| AdminCategory {
                id: entry.category.id,
                name: entry.category.name,
                description: entry.category.description,
                color: entry.category.color,
                activity_count: entry.count,
            })
            .collect(),
    )
}
