use chrono::{DateTime, FixedOffset};
use sea_orm::Set;
use serde::Deserialize;

use super::{FormErrors, INVALID_CHOICE, REQUIRED, format_datetime_input, parse_datetime};
use crate::db::entities::activity::{self, ActivityStatus, Priority, TITLE_MAX_LEN};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ActivityForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    pub duration_minutes: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityInput {
    pub title: String,
    pub description: String,
    pub category_id: i32,
    pub priority: Priority,
    pub status: ActivityStatus,
    pub start_date: DateTime<FixedOffset>,
    pub end_date: Option<DateTime<FixedOffset>>,
    pub duration_minutes: Option<i32>,
    pub notes: String,
}

impl ActivityForm {
    /// Blank form for the create page.
    pub fn initial(now: &DateTime<FixedOffset>) -> Self {
        Self {
            priority: Priority::default().as_str().to_string(),
            status: ActivityStatus::default().as_str().to_string(),
            start_date: format_datetime_input(now),
            ..Default::default()
        }
    }

    pub fn from_model(model: &activity::Model) -> Self {
        Self {
            title: model.title.clone(),
            description: model.description.clone(),
            category: model.category_id.to_string(),
            priority: model.priority.as_str().to_string(),
            status: model.status.as_str().to_string(),
            start_date: format_datetime_input(&model.start_date),
            end_date: model
                .end_date
                .as_ref()
                .map(format_datetime_input)
                .unwrap_or_default(),
            duration_minutes: model
                .duration_minutes
                .map(|minutes| minutes.to_string())
                .unwrap_or_default(),
            notes: model.notes.clone(),
        }
    }

    /// Field-level checks. Whether the category exists is checked by the
    /// service, which owns the lookup.
    pub fn validate(&self, now: DateTime<FixedOffset>) -> Result<ActivityInput, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", REQUIRED);
        } else if title.chars().count() > TITLE_MAX_LEN {
            errors.add(
                "title",
                format!("Ensure this value has at most {TITLE_MAX_LEN} characters."),
            );
        }

        let category = self.category.trim();
        let category_id = if category.is_empty() {
            errors.add("category", REQUIRED);
            0
        } else {
            match category.parse::<i32>() {
                Ok(id) if id > 0 => id,
                _ => {
                    errors.add("category", INVALID_CHOICE);
                    0
                }
            }
        };

        let priority = match self.priority.trim() {
            "" => Priority::default(),
            raw => Priority::try_from(raw).unwrap_or_else(|_| {
                errors.add("priority", INVALID_CHOICE);
                Priority::default()
            }),
        };

        let status = match self.status.trim() {
            "" => ActivityStatus::default(),
            raw => ActivityStatus::try_from(raw).unwrap_or_else(|_| {
                errors.add("status", INVALID_CHOICE);
                ActivityStatus::default()
            }),
        };

        let start_date = match self.start_date.trim() {
            "" => now,
            raw => parse_datetime(raw).unwrap_or_else(|| {
                errors.add("start_date", "Enter a valid date/time.");
                now
            }),
        };

        let end_date = match self.end_date.trim() {
            "" => None,
            raw => match parse_datetime(raw) {
                Some(end) => Some(end),
                None => {
                    errors.add("end_date", "Enter a valid date/time.");
                    None
                }
            },
        };
        if let Some(end) = end_date
            && !errors.has("start_date")
            && end < start_date
        {
            errors.add("end_date", "End date cannot be before the start date.");
        }

        let duration_minutes = match self.duration_minutes.trim() {
            "" => None,
            raw => match raw.parse::<i32>() {
                Ok(minutes) if minutes >= 0 => Some(minutes),
                Ok(_) => {
                    errors.add(
                        "duration_minutes",
                        "Ensure this value is greater than or equal to 0.",
                    );
                    None
                }
                Err(_) => {
                    errors.add("duration_minutes", "Enter a whole number.");
                    None
                }
            },
        };

        errors.into_result(|| ActivityInput {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            category_id,
            priority,
            status,
            start_date,
            end_date,
            duration_minutes,
            notes: self.notes.trim().to_string(),
        })
    }
}

impl ActivityInput {
    pub fn into_active_model(self, user_id: i32) -> activity::ActiveModel {
        let mut active = activity::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        };
        self.apply(&mut active);
        active
    }

    /// Copies every editable field onto `active`; ownership is left alone.
    pub fn apply(self, active: &mut activity::ActiveModel) {
        active.title = Set(self.title);
        active.description = Set(self.description);
        active.category_id = Set(self.category_id);
        active.priority = Set(self.priority);
        active.status = Set(self.status);
        active.start_date = Set(self.start_date);
        active.end_date = Set(self.end_date);
        active.duration_minutes = Set(self.duration_minutes);
        active.notes = Set(self.notes);
    }
}
