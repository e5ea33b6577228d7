use std::collections::HashMap;

use serde::Serialize;

use crate::db::entities::{activity, category};

/// `round(part / whole * 100)` with ties rounded to even; 0 for a missing or
/// zero denominator, a missing numerator, or a non-finite result.
pub fn percent(part: Option<f64>, whole: Option<f64>) -> i64 {
    let (Some(part), Some(whole)) = (part, whole) else {
        return 0;
    };
    if whole == 0.0 {
        return 0;
    }
    let value = (part / whole * 100.0).round_ties_even();
    if value.is_finite() { value as i64 } else { 0 }
}

pub fn percent_of(part: u64, whole: u64) -> i64 {
    percent(Some(part as f64), Some(whole as f64))
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: category::Model,
    pub count: i64,
}

/// Pairs each category with its activity count, keeping the order of
/// `categories`. With `include_empty = false` categories without activities
/// are dropped.
pub fn merge_category_counts(
    categories: Vec<category::Model>,
    counts: &[(i32, i64)],
    include_empty: bool,
) -> Vec<CategoryCount> {
    let by_id: HashMap<i32, i64> = counts.iter().copied().collect();
    categories
        .into_iter()
        .map(|category| {
            let count = by_id.get(&category.id).copied().unwrap_or(0);
            CategoryCount { category, count }
        })
        .filter(|entry| include_empty || entry.count > 0)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub overdue: u64,
    pub completion_percent: i64,
    pub recent: Vec<activity::Model>,
    pub by_category: Vec<CategoryCount>,
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::{merge_category_counts, percent, percent_of};
    use crate::db::entities::category;

    fn category(id: i32, name: &str) -> category::Model {
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

    #[test]
    fn percent_handles_zero_and_missing_inputs() {
        assert_eq!(percent(Some(5.0), Some(0.0)), 0);
        assert_eq!(percent(Some(0.0), Some(0.0)), 0);
        assert_eq!(percent(None, Some(10.0)), 0);
        assert_eq!(percent(Some(3.0), None), 0);
        assert_eq!(percent(Some(f64::INFINITY), Some(1.0)), 0);
        assert_eq!(percent(Some(f64::NAN), Some(1.0)), 0);
    }

    #[test]
    fn percent_rounds_half_to_even() {
        assert_eq!(percent(Some(50.0), Some(200.0)), 25);
        assert_eq!(percent(Some(1.0), Some(3.0)), 33);
        assert_eq!(percent(Some(2.0), Some(3.0)), 67);
        assert_eq!(percent(Some(1.0), Some(8.0)), 12);
        assert_eq!(percent(Some(3.0), Some(8.0)), 38);
        assert_eq!(percent_of(7, 7), 100);
    }

    #[test]
    fn merge_keeps_order_and_optionally_empty_categories() {
        let categories = vec![category(2, "Chores"), category(1, "Fitness"), category(3, "Work")];
        let counts = [(1, 4), (3, 1)];

        let all = merge_category_counts(categories.clone(), &counts, true);
        let names: Vec<(&str, i64)> = all
            .iter()
            .map(|entry| (entry.category.name.as_str(), entry.count))
            .collect();
        assert_eq!(names, vec![("Chores", 0), ("Fitness", 4), ("Work", 1)]);

        let non_empty = merge_category_counts(categories, &counts, false);
        assert_eq!(non_empty.len(), 2);
        assert_eq!(non_empty[0].category.id, 1);
    }
}
