use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, QueryFilter, QuerySelect,
};

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse, base::OrderBy};
use crate::db::entities::activity::{self, ActivityStatus};
use crate::db::entities::prelude::Activity;

#[derive(Clone)]
pub struct ActivityDao {
    db: DatabaseConnection,
}

impl DaoBase for ActivityDao {
    type Entity = Activity;
    const ENTITY_NAME: &'static str = "activity";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Most recent start date first; id breaks ties so pages stay stable.
pub fn listing_order() -> OrderBy<Activity> {
    vec![
        (activity::Column::StartDate, Order::Desc),
        (activity::Column::Id, Order::Desc),
    ]
}

impl ActivityDao {
    pub async fn create_activity(
        &self,
        model: activity::ActiveModel,
    ) -> DaoResult<activity::Model> {
        self.create(model).await
    }

    pub async fn find_owned(&self, user_id: i32, id: i32) -> DaoResult<Option<activity::Model>> {
        self.find(1, 1, Vec::new(), move |query| {
            query
                .filter(activity::Column::Id.eq(id))
                .filter(activity::Column::UserId.eq(user_id))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    /// Missing and foreign rows are indistinguishable to the caller.
    pub async fn require_owned(&self, user_id: i32, id: i32) -> DaoResult<activity::Model> {
        self.find_owned(user_id, id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn update_owned<F>(
        &self,
        user_id: i32,
        id: i32,
        apply: F,
    ) -> DaoResult<activity::Model>
    where
        F: for<'a> FnOnce(&'a mut activity::ActiveModel) + Send,
    {
        let model = self.require_owned(user_id, id).await?;
        self.update_model(model, apply).await
    }

    pub async fn delete_owned(&self, user_id: i32, id: i32) -> DaoResult<()> {
        let result = Activity::delete_many()
            .filter(activity::Column::Id.eq(id))
            .filter(activity::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    pub async fn count_matching(&self, condition: Condition) -> DaoResult<u64> {
        self.count(move |query| query.filter(condition)).await
    }

    pub async fn page_matching(
        &self,
        condition: Condition,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<activity::Model>> {
        self.find(page, page_size, listing_order(), move |query| {
            query.filter(condition)
        })
        .await
    }

    pub async fn count_for_user(
        &self,
        user_id: i32,
        status: Option<ActivityStatus>,
    ) -> DaoResult<u64> {
        self.count(move |query| {
            let query = query.filter(activity::Column::UserId.eq(user_id));
            match status {
                Some(status) => query.filter(activity::Column::Status.eq(status)),
                None => query,
            }
        })
        .await
    }

    pub async fn list_for_user(&self, user_id: i32) -> DaoResult<Vec<activity::Model>> {
        self.find_iter(None, listing_order(), move |query| {
            query.filter(activity::Column::UserId.eq(user_id))
        })
        .collect_all()
        .await
    }

    pub async fn recent_for_user(
        &self,
        user_id: i32,
        limit: u64,
    ) -> DaoResult<Vec<activity::Model>> {
        self.find(1, limit, listing_order(), move |query| {
            query.filter(activity::Column::UserId.eq(user_id))
        })
        .await
        .map(|response| response.data)
    }

    /// `(category_id, activity_count)` for every category with at least one
    /// matching activity, optionally scoped to one owner.
    pub async fn count_by_category(&self, user_id: Option<i32>) -> DaoResult<Vec<(i32, i64)>> {
        let mut query = Activity::find()
            .select_only()
            .column(activity::Column::CategoryId)
            .column_as(activity::Column::Id.count(), "activity_count");
        if let Some(user_id) = user_id {
            query = query.filter(activity::Column::UserId.eq(user_id));
        }

        query
            .group_by(activity::Column::CategoryId)
            .into_tuple::<(i32, i64)>()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}
