use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, Set, TransactionTrait,
};
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::{Activity, Category};
use crate::db::entities::{activity, category};

#[derive(Clone)]
pub struct CategoryDao {
    db: DatabaseConnection,
}

impl DaoBase for CategoryDao {
    type Entity = Category;
    const ENTITY_NAME: &'static str = "category";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl CategoryDao {
    pub async fn create_category(
        &self,
        name: &str,
        description: &str,
        color: &str,
    ) -> DaoResult<category::Model> {
        let model = category::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            color: Set(color.to_string()),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list_all(&self) -> DaoResult<Vec<category::Model>> {
        self.find_iter(None, vec![(category::Column::Name, Order::Asc)], |query| query)
            .collect_all()
            .await
    }

    pub async fn find_by_name(&self, name: &str) -> DaoResult<Option<category::Model>> {
        let name = name.to_string();
        self.find(1, 1, Vec::new(), move |query| {
            query.filter(category::Column::Name.eq(name))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    pub async fn exists(&self, id: i32) -> DaoResult<bool> {
        match self.find_by_id(id).await {
            Ok(_) => Ok(true),
            Err(DaoLayerError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Case-insensitive substring match on the name, ordered by name.
    pub async fn search_by_name(&self, search: &str) -> DaoResult<Vec<category::Model>> {
        let pattern = contains_pattern(search);
        self.find_iter(
            None,
            vec![(category::Column::Name, Order::Asc)],
            move |query| {
                query.filter(
                    Expr::expr(Func::lower(Expr::col(category::Column::Name)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
            },
        )
        .collect_all()
        .await
    }

    /// Removes the category together with every activity filed under it.
    /// Returns the number of activities removed.
    pub async fn delete_with_activities(&self, id: i32) -> DaoResult<u64> {
        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;

        let removed = Activity::delete_many()
            .filter(activity::Column::CategoryId.eq(id))
            .exec(&txn)
            .await
            .map_err(DaoLayerError::Db)?
            .rows_affected;

        let result = Category::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(DaoLayerError::Db)?;
        if result.rows_affected == 0 {
            txn.rollback().await.map_err(DaoLayerError::Db)?;
            return Err(Self::not_found(id));
        }

        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(removed)
    }
}

/// Lower-cased `%term%` pattern with LIKE wildcards escaped by `\`.
pub fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
