use crate::{
    db::dao::{ActivityDao, CategoryDao},
    db::entities::category,
    error::AppError,
    forms::CategoryInput,
    services::stats::{CategoryCount, merge_category_counts},
};

pub const NAME_TAKEN: &str = "Category with this Name already exists.";

#[derive(Clone)]
pub struct CategoryService {
    category_dao: CategoryDao,
    activity_dao: ActivityDao,
}

impl CategoryService {
    pub fn new(category_dao: CategoryDao, activity_dao: ActivityDao) -> Self {
        Self {
            category_dao,
            activity_dao,
        }
    }

    pub async fn list_all(&self) -> Result<Vec<category::Model>, AppError> {
        Ok(self.category_dao.list_all().await?)
    }

    pub async fn exists(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.category_dao.exists(id).await?)
    }

    /// Every category, ordered by name, with the number of activities it
    /// holds. `owner` restricts the count to one user's activities.
    pub async fn list_with_counts(&self, owner: Option<i32>) -> Result<Vec<CategoryCount>, AppError> {
        let categories = self.category_dao.list_all().await?;
        let counts = self.activity_dao.count_by_category(owner).await?;
        Ok(merge_category_counts(categories, &counts, true))
    }

    /// Categories whose name contains `search`, each with its global count.
    pub async fn search_with_counts(&self, search: Option<&str>) -> Result<Vec<CategoryCount>, AppError> {
        let categories = match search.map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => self.category_dao.search_by_name(term).await?,
            None => self.category_dao.list_all().await?,
        };
        let counts = self.activity_dao.count_by_category(None).await?;
        Ok(merge_category_counts(categories, &counts, true))
    }

    pub async fn create(&self, input: &CategoryInput) -> Result<category::Model, AppError> {
        if self.category_dao.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict(NAME_TAKEN));
        }

        let model = self
            .category_dao
            .create_category(&input.name, &input.description, &input.color)
            .await?;
        tracing::info!(category_id = model.id, name = %model.name, "created category");
        Ok(model)
    }

    pub async fn delete(&self, id: i32) -> Result<u64, AppError> {
        let removed = self.category_dao.delete_with_activities(id).await?;
        tracing::info!(category_id = id, removed, "deleted category with its activities");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{
        db::entities::category, error::AppError, forms::CategoryInput, services::ServiceContext,
    };

    use super::NAME_TAKEN;

    fn category_model(id: i32, name: &str) -> category::Model {
        category::Model {
            id,
            created_at: FixedOffset::east_opt(0)
                .expect("offset should be valid")
                .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                .single()
                .expect("timestamp should be valid"),
            name: name.to_string(),
            description: String::new(),
            color: category::DEFAULT_COLOR.to_string(),
        }
    }

    fn input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            description: String::new(),
            color: category::DEFAULT_COLOR.to_string(),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_names() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[category_model(1, "Fitness")]])
            .into_connection();
        let service = ServiceContext::new(&db).category();

        let err = service
            .create(&input("Fitness"))
            .await
            .expect_err("create should fail");
        assert!(matches!(err, AppError::Conflict(ref message) if message == NAME_TAKEN));
    }

    #[tokio::test]
    async fn create_inserts_new_category() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new(), vec![category_model(4, "Reading")]])
            .into_connection();
        let service = ServiceContext::new(&db).category();

        let model = service
            .create(&input("Reading"))
            .await
            .expect("create should succeed");
        assert_eq!(model.id, 4);
    }
}
