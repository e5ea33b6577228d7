use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_LEN: usize = 200;

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(indexed)]
    pub category_id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    pub priority: Priority,
    pub status: ActivityStatus,
    #[sea_orm(indexed)]
    pub start_date: DateTimeWithTimeZone,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub duration_minutes: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    #[sea_orm(belongs_to, from = "category_id", to = "id", on_delete = "Cascade")]
    pub category: HasOne<super::category::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// An activity is overdue once its end date has passed without it being completed.
    pub fn is_overdue(&self, now: DateTimeWithTimeZone) -> bool {
        is_overdue(self.end_date, self.status, now)
    }
}

pub fn is_overdue(
    end_date: Option<DateTimeWithTimeZone>,
    status: ActivityStatus,
    now: DateTimeWithTimeZone,
) -> bool {
    match end_date {
        Some(end) if status != ActivityStatus::Completed => now > end,
        _ => false,
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[sea_orm(string_value = "low")]
    Low,
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == value)
            .ok_or(())
    }
}

/// Lifecycle: planned -> in_progress -> completed, with cancelled reachable
/// from planned or in_progress. Updates may set any status directly.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    #[sea_orm(string_value = "planned")]
    Planned,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl ActivityStatus {
    pub const ALL: [ActivityStatus; 4] = [
        ActivityStatus::Planned,
        ActivityStatus::InProgress,
        ActivityStatus::Completed,
        ActivityStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Planned => "planned",
            ActivityStatus::InProgress => "in_progress",
            ActivityStatus::Completed => "completed",
            ActivityStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityStatus::Planned => "Planned",
            ActivityStatus::InProgress => "In Progress",
            ActivityStatus::Completed => "Completed",
            ActivityStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether `next` follows the lifecycle graph. Not enforced on update.
    pub fn is_expected_transition(&self, next: ActivityStatus) -> bool {
        use ActivityStatus::*;
        matches!(
            (self, next),
            (Planned, InProgress)
                | (Planned, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        ) || *self == next
    }
}

impl TryFrom<&str> for ActivityStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ActivityStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone};

    use super::{ActivityStatus, Priority, is_overdue};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    #[test]
    fn overdue_requires_end_date_in_the_past() {
        let now = ts();
        let past = now - Duration::hours(1);
        let future = now + Duration::hours(1);

        assert!(is_overdue(Some(past), ActivityStatus::Planned, now));
        assert!(is_overdue(Some(past), ActivityStatus::InProgress, now));
        assert!(is_overdue(Some(past), ActivityStatus::Cancelled, now));
        assert!(!is_overdue(Some(future), ActivityStatus::Planned, now));
        assert!(!is_overdue(None, ActivityStatus::Planned, now));
    }

    #[test]
    fn completed_activity_is_never_overdue() {
        let now = ts();
        assert!(!is_overdue(
            Some(now - Duration::days(30)),
            ActivityStatus::Completed,
            now
        ));
    }

    #[test]
    fn end_date_equal_to_now_is_not_overdue() {
        let now = ts();
        assert!(!is_overdue(Some(now), ActivityStatus::Planned, now));
    }

    #[test]
    fn parses_known_choices_only() {
        assert_eq!(ActivityStatus::try_from("in_progress"), Ok(ActivityStatus::InProgress));
        assert_eq!(Priority::try_from("high"), Ok(Priority::High));
        assert!(ActivityStatus::try_from("done").is_err());
        assert!(Priority::try_from("HIGH").is_err());
    }

    #[test]
    fn lifecycle_graph_allows_forward_moves_and_cancellation() {
        use ActivityStatus::*;
        assert!(Planned.is_expected_transition(InProgress));
        assert!(InProgress.is_expected_transition(Completed));
        assert!(Planned.is_expected_transition(Cancelled));
        assert!(!Completed.is_expected_transition(Planned));
        assert!(!Cancelled.is_expected_transition(InProgress));
        assert!(Completed.is_expected_transition(Completed));
    }
}
