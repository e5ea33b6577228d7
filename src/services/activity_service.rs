use chrono::{DateTime, FixedOffset};

use crate::{
    db::dao::{ActivityDao, CategoryDao, DaoBase, UserDao, category_dao::contains_pattern},
    db::entities::activity::{self, ActivityStatus},
    error::AppError,
    forms::{ActivityInput, INVALID_CHOICE},
    services::{
        activity_filter::ActivityFilter,
        pagination::{ACTIVITY_PAGE_SIZE, Page, resolve_page},
        stats::{DashboardStats, merge_category_counts, percent_of},
    },
};

const RECENT_LIMIT: u64 = 5;

#[derive(Clone)]
pub struct ActivityService {
    activity_dao: ActivityDao,
    category_dao: CategoryDao,
    user_dao: UserDao,
}

impl ActivityService {
    pub fn new(activity_dao: ActivityDao, category_dao: CategoryDao, user_dao: UserDao) -> Self {
        Self {
            activity_dao,
            category_dao,
            user_dao,
        }
    }

    /// One page of the owner's activities matching `filter`.
    pub async fn list(
        &self,
        user_id: i32,
        filter: &ActivityFilter,
        page: Option<&str>,
    ) -> Result<Page<activity::Model>, AppError> {
        self.page_for(filter.condition(Some(user_id), &[]), page, ACTIVITY_PAGE_SIZE)
            .await
    }

    /// Every user's activities; the text search also matches owner usernames.
    pub async fn list_all(
        &self,
        filter: &ActivityFilter,
        page: Option<&str>,
        page_size: u64,
    ) -> Result<Page<activity::Model>, AppError> {
        let owner_ids = match &filter.search {
            Some(search) => {
                self.user_dao
                    .ids_matching_username(&contains_pattern(search))
                    .await?
            }
            None => Vec::new(),
        };
        self.page_for(filter.condition(None, &owner_ids), page, page_size)
            .await
    }

    async fn page_for(
        &self,
        condition: sea_orm::Condition,
        page: Option<&str>,
        page_size: u64,
    ) -> Result<Page<activity::Model>, AppError> {
        let total = self.activity_dao.count_matching(condition.clone()).await?;
        let number = resolve_page(page, total, page_size);
        let response = self
            .activity_dao
            .page_matching(condition, number, page_size)
            .await?;
        Ok(Page::new(response.data, number, total, page_size))
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<activity::Model, AppError> {
        Ok(self.activity_dao.require_owned(user_id, id).await?)
    }

    pub async fn create(
        &self,
        user_id: i32,
        input: ActivityInput,
    ) -> Result<activity::Model, AppError> {
        self.ensure_category(input.category_id).await?;
        let model = self
            .activity_dao
            .create_activity(input.into_active_model(user_id))
            .await?;
        tracing::info!(activity_id = model.id, user_id, "created activity");
        Ok(model)
    }

    pub async fn update(
        &self,
        user_id: i32,
        id: i32,
        input: ActivityInput,
    ) -> Result<activity::Model, AppError> {
        let current = self.activity_dao.require_owned(user_id, id).await?;
        self.ensure_category(input.category_id).await?;

        log_transition(&current, input.status);
        Ok(self
            .activity_dao
            .update_model(current, move |active| input.apply(active))
            .await?)
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<(), AppError> {
        self.activity_dao.delete_owned(user_id, id).await?;
        tracing::info!(activity_id = id, user_id, "deleted activity");
        Ok(())
    }

    pub async fn dashboard(
        &self,
        user_id: i32,
        now: DateTime<FixedOffset>,
    ) -> Result<DashboardStats, AppError> {
        let total = self.activity_dao.count_for_user(user_id, None).await?;
        let completed = self
            .activity_dao
            .count_for_user(user_id, Some(ActivityStatus::Completed))
            .await?;
        let in_progress = self
            .activity_dao
            .count_for_user(user_id, Some(ActivityStatus::InProgress))
            .await?;
        let overdue = self
            .activity_dao
            .list_for_user(user_id)
            .await?
            .iter()
            .filter(|activity| activity.is_overdue(now))
            .count() as u64;
        let recent = self
            .activity_dao
            .recent_for_user(user_id, RECENT_LIMIT)
            .await?;
        let categories = self.category_dao.list_all().await?;
        let counts = self.activity_dao.count_by_category(Some(user_id)).await?;

        Ok(DashboardStats {
            total,
            completed,
            in_progress,
            overdue,
            completion_percent: percent_of(completed, total),
            recent,
            by_category: merge_category_counts(categories, &counts, false),
        })
    }

    async fn ensure_category(&self, category_id: i32) -> Result<(), AppError> {
        if self.category_dao.exists(category_id).await? {
            Ok(())
        } else {
            Err(AppError::validation(INVALID_CHOICE))
        }
    }
}

fn log_transition(current: &activity::Model, next: ActivityStatus) {
    if !current.status.is_expected_transition(next) {
        tracing::debug!(
            activity_id = current.id,
            from = current.status.as_str(),
            to = next.as_str(),
            "status change outside the usual lifecycle"
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{
        db::entities::activity::{self, ActivityStatus, Priority},
        db::entities::category,
        error::AppError,
        forms::ActivityInput,
        services::{ServiceContext, activity_filter::ActivityFilter},
    };

    fn ts() -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn activity_model(id: i32, user_id: i32) -> activity::Model {
        activity::Model {
            id,
            created_at: ts(),
            updated_at: ts(),
            title: format!("Activity {id}"),
            description: String::new(),
            category_id: 1,
            user_id,
            priority: Priority::Medium,
            status: ActivityStatus::Planned,
            start_date: ts(),
            end_date: None,
            duration_minutes: None,
            notes: String::new(),
        }
    }

    fn input(category_id: i32) -> ActivityInput {
        ActivityInput {
            title: "Swim".to_string(),
            description: String::new(),
            category_id,
            priority: Priority::Low,
            status: ActivityStatus::Planned,
            start_date: ts(),
            end_date: None,
            duration_minutes: Some(30),
            notes: String::new(),
        }
    }

    fn count_row(count: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(count)))])
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()])
            .into_connection();
        let service = ServiceContext::new(&db).activity();

        let err = service
            .create(1, input(77))
            .await
            .expect_err("create should fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_applies_input_to_owned_activity() {
        let current = activity_model(4, 2);
        let mut updated = current.clone();
        updated.title = "Swim".to_string();
        updated.priority = Priority::Low;
        updated.duration_minutes = Some(30);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![current]])
            .append_query_results([vec![category::Model {
                id: 1,
                created_at: ts(),
                name: "Sport".to_string(),
                description: String::new(),
                color: category::DEFAULT_COLOR.to_string(),
            }]])
            .append_query_results([vec![updated]])
            .into_connection();
        let service = ServiceContext::new(&db).activity();

        let model = service
            .update(2, 4, input(1))
            .await
            .expect("update should succeed");
        assert_eq!(model.id, 4);
        assert_eq!(model.title, "Swim");
        assert_eq!(model.priority, Priority::Low);
        assert_eq!(model.duration_minutes, Some(30));
    }

    #[tokio::test]
    async fn update_rejects_foreign_activity() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<activity::Model>::new()])
            .into_connection();
        let service = ServiceContext::new(&db).activity();

        let err = service
            .update(9, 4, input(1))
            .await
            .expect_err("update should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_maps_foreign_activity_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<activity::Model>::new()])
            .into_connection();
        let service = ServiceContext::new(&db).activity();

        let err = service.get(2, 5).await.expect_err("lookup should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_clamps_page_past_the_end() {
        let rows = vec![activity_model(10, 3)];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(10)]])
            .append_query_results([rows])
            .into_connection();
        let service = ServiceContext::new(&db).activity();

        let page = service
            .list(3, &ActivityFilter::default(), Some("40"))
            .await
            .expect("list should succeed");
        assert_eq!(page.number, 2);
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.total, 10);
        assert_eq!(page.items.len(), 1);
        assert!(page.has_previous);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn dashboard_counts_overdue_in_memory() {
        let now = ts();
        let mut overdue = activity_model(1, 3);
        overdue.end_date = Some(now - Duration::hours(2));
        let mut done = activity_model(2, 3);
        done.status = ActivityStatus::Completed;
        done.end_date = Some(now - Duration::hours(2));
        let upcoming = activity_model(3, 3);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(3)], [count_row(1)], [count_row(0)]])
            .append_query_results([vec![overdue.clone(), done.clone(), upcoming.clone()]])
            .append_query_results([vec![overdue, done, upcoming]])
            .append_query_results([Vec::<category::Model>::new()])
            .append_query_results([Vec::<std::collections::BTreeMap<&'static str, sea_orm::Value>>::new()])
            .into_connection();
        let service = ServiceContext::new(&db).activity();

        let stats = service.dashboard(3, now).await.expect("dashboard should load");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completion_percent, 33);
        assert_eq!(stats.recent.len(), 3);
        assert!(stats.by_category.is_empty());
    }
}
