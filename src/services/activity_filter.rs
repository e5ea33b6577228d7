use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{ColumnTrait, Condition};
use serde::Deserialize;

use crate::db::dao::category_dao::contains_pattern;
use crate::db::entities::activity;

/// Query string of the activity listings. Everything is optional and kept as
/// text so malformed values can be ignored instead of rejected.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ActivityQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActivityFilter {
    pub category_id: Option<i32>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

impl ActivityFilter {
    pub fn from_query(query: &ActivityQuery) -> Self {
        Self {
            category_id: query.category.as_deref().and_then(parse_category),
            status: non_empty(query.status.as_deref()),
            priority: non_empty(query.priority.as_deref()),
            search: query.search.clone().filter(|value| !value.is_empty()),
        }
    }

    /// Conjunction of every supplied criterion. `owner` scopes the result to
    /// one user; `search_owner_ids` widens the text search to activities of
    /// those owners.
    pub fn condition(&self, owner: Option<i32>, search_owner_ids: &[i32]) -> Condition {
        let mut condition = Condition::all();
        if let Some(user_id) = owner {
            condition = condition.add(activity::Column::UserId.eq(user_id));
        }
        if let Some(category_id) = self.category_id {
            condition = condition.add(activity::Column::CategoryId.eq(category_id));
        }
        if let Some(status) = &self.status {
            condition = condition.add(activity::Column::Status.eq(status.as_str()));
        }
        if let Some(priority) = &self.priority {
            condition = condition.add(activity::Column::Priority.eq(priority.as_str()));
        }
        if let Some(search) = &self.search {
            let pattern = contains_pattern(search);
            let mut any = Condition::any()
                .add(lower_like(activity::Column::Title, &pattern))
                .add(lower_like(activity::Column::Description, &pattern));
            if !search_owner_ids.is_empty() {
                any = any.add(activity::Column::UserId.is_in(search_owner_ids.iter().copied()));
            }
            condition = condition.add(any);
        }
        condition
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn lower_like(column: activity::Column, pattern: &str) -> Expr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Only ASCII digits are accepted; anything else means "no category filter".
fn parse_category(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i32>().ok().filter(|id| *id > 0)
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    use super::{ActivityFilter, ActivityQuery, parse_category};
    use crate::db::entities::prelude::Activity;

    fn query(pairs: &[(&str, &str)]) -> ActivityQuery {
        let encoded = serde_urlencoded::to_string(pairs).expect("pairs should encode");
        serde_urlencoded::from_str(&encoded).expect("query should decode")
    }

    fn sql_for(filter: &ActivityFilter, owner: Option<i32>, ids: &[i32]) -> String {
        Activity::find()
            .filter(filter.condition(owner, ids))
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn malformed_category_is_ignored() {
        assert_eq!(parse_category("12"), Some(12));
        assert_eq!(parse_category(" 7 "), Some(7));
        assert_eq!(parse_category("1a"), None);
        assert_eq!(parse_category("-1"), None);
        assert_eq!(parse_category("+1"), None);
        assert_eq!(parse_category("0"), None);
        assert_eq!(parse_category("99999999999"), None);
        assert_eq!(parse_category(""), None);
    }

    #[test]
    fn blank_values_are_dropped() {
        let filter = ActivityFilter::from_query(&query(&[
            ("category", "x"),
            ("status", ""),
            ("priority", "  "),
            ("search", ""),
        ]));
        assert!(filter.is_empty());
    }

    #[test]
    fn search_text_is_kept_verbatim() {
        let filter = ActivityFilter::from_query(&query(&[("search", " run")]));
        assert_eq!(filter.search.as_deref(), Some(" run"));

        let spaces = ActivityFilter::from_query(&query(&[("search", "  ")]));
        assert_eq!(spaces.search.as_deref(), Some("  "));
    }

    #[test]
    fn every_criterion_lands_in_the_condition() {
        let filter = ActivityFilter::from_query(&query(&[
            ("category", "3"),
            ("status", "planned"),
            ("priority", "high"),
            ("search", "Run"),
        ]));
        let sql = sql_for(&filter, Some(5), &[]);

        assert!(sql.contains(r#""activities"."user_id" = 5"#), "{sql}");
        assert!(sql.contains(r#""activities"."category_id" = 3"#), "{sql}");
        assert!(sql.contains(r#""activities"."status" = 'planned'"#), "{sql}");
        assert!(sql.contains(r#""activities"."priority" = 'high'"#), "{sql}");
        assert!(sql.contains("LIKE '%run%'"), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn search_wildcards_match_literally() {
        let filter = ActivityFilter {
            search: Some("50%_off".to_string()),
            ..Default::default()
        };
        let sql = sql_for(&filter, None, &[]);
        assert!(sql.contains(r"50\%"), "{sql}");
        assert!(sql.contains(r"\_off"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
    }

    #[test]
    fn owner_search_ids_widen_the_text_match() {
        let filter = ActivityFilter {
            search: Some("bob".to_string()),
            ..Default::default()
        };
        let sql = sql_for(&filter, None, &[4, 9]);
        assert!(sql.contains(r#""activities"."user_id" IN (4, 9)"#), "{sql}");
        assert!(!sql.contains(r#""activities"."user_id" = "#), "{sql}");
    }
}
