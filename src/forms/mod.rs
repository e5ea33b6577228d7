//! Raw form payloads and their validated, typed counterparts.
//!
//! Every form deserializes from `application/x-www-form-urlencoded` into a
//! struct of plain strings so that a rejected submission can be rendered back
//! verbatim. `validate` turns it into an input struct or a [`FormErrors`].

pub mod activity;
pub mod auth;
pub mod category;

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

pub use activity::{ActivityForm, ActivityInput};
pub use auth::{LoginForm, RegisterForm, RegisterInput};
pub use category::{CategoryForm, CategoryInput};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Messages for `field` joined into one line, empty when the field is valid.
    pub fn field(&self, field: &str) -> String {
        self.fields
            .get(field)
            .map(|messages| messages.join(" "))
            .unwrap_or_default()
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a `datetime-local` style value as UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Value for an `<input type="datetime-local">`.
pub fn format_datetime_input(value: &DateTime<FixedOffset>) -> String {
    value.with_timezone(&Utc).format("%Y-%m-%dT%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{FormErrors, format_datetime_input, parse_datetime};

    #[test]
    fn parses_html_and_space_separated_datetimes() {
        let expected = Utc
            .with_ymd_and_hms(2026, 3, 4, 9, 30, 0)
            .single()
            .expect("timestamp should be valid")
            .fixed_offset();

        assert_eq!(parse_datetime("2026-03-04T09:30"), Some(expected));
        assert_eq!(parse_datetime("2026-03-04T09:30:00"), Some(expected));
        assert_eq!(parse_datetime("2026-03-04 09:30"), Some(expected));
        assert_eq!(parse_datetime(" 2026-03-04 09:30:00 "), Some(expected));
        assert_eq!(parse_datetime("04/03/2026"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn formats_for_datetime_local_inputs() {
        let value = parse_datetime("2026-03-04 09:30:15").expect("value should parse");
        assert_eq!(format_datetime_input(&value), "2026-03-04T09:30");
    }

    #[test]
    fn errors_collect_per_field() {
        let mut errors = FormErrors::default();
        assert!(errors.is_empty());

        errors.add("title", "first");
        errors.add("title", "second");
        errors.add_non_field("general");

        assert!(errors.has("title"));
        assert!(!errors.has("notes"));
        assert_eq!(errors.field("title"), "first second");
        assert_eq!(errors.field("notes"), "");
        assert_eq!(errors.non_field(), ["general".to_string()]);
        assert!(errors.into_result(|| ()).is_err());
    }
}
