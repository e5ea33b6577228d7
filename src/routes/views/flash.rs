use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::Duration;

pub const FLASH_COOKIE: &str = "flash";

/// One-shot success messages shown on the page after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Registered,
    ActivityCreated,
    ActivityUpdated,
    ActivityDeleted,
    CategoryCreated,
    CategoryDeleted,
}

impl Flash {
    const ALL: [Flash; 6] = [
        Flash::Registered,
        Flash::ActivityCreated,
        Flash::ActivityUpdated,
        Flash::ActivityDeleted,
        Flash::CategoryCreated,
        Flash::CategoryDeleted,
    ];

    fn code(&self) -> &'static str {
        match self {
            Flash::Registered => "registered",
            Flash::ActivityCreated => "activity-created",
            Flash::ActivityUpdated => "activity-updated",
            Flash::ActivityDeleted => "activity-deleted",
            Flash::CategoryCreated => "category-created",
            Flash::CategoryDeleted => "category-deleted",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Flash::Registered => "Registration successful!",
            Flash::ActivityCreated => "Activity created successfully!",
            Flash::ActivityUpdated => "Activity updated successfully!",
            Flash::ActivityDeleted => "Activity deleted successfully!",
            Flash::CategoryCreated => "Category created successfully!",
            Flash::CategoryDeleted => "Category deleted successfully!",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.code() == code)
    }
}

/// Queues `flash` for the next rendered page.
pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    let value = match jar.get(FLASH_COOKIE).map(|cookie| cookie.value().to_string()) {
        Some(existing) if !existing.is_empty() => format!("{existing}.{}", flash.code()),
        _ => flash.code().to_string(),
    };
    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true)
            .max_age(Duration::minutes(5))
            .build(),
    )
}

/// Reads and clears queued messages; unknown codes are dropped.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<String>) {
    let Some(raw) = jar.get(FLASH_COOKIE).map(|cookie| cookie.value().to_string()) else {
        return (jar, Vec::new());
    };
    let messages = raw
        .split('.')
        .filter_map(Flash::from_code)
        .map(|flash| flash.message().to_string())
        .collect();

    let mut expired = Cookie::from(FLASH_COOKIE);
    expired.set_value("");
    expired.set_path("/");
    expired.set_max_age(Duration::seconds(0));
    (jar.add(expired), messages)
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::{Cookie, CookieJar};

    use super::{FLASH_COOKIE, Flash, push, take};

    #[test]
    fn pushed_messages_are_taken_once_in_order() {
        let jar = push(CookieJar::new(), Flash::Registered);
        let jar = push(jar, Flash::ActivityCreated);

        let (jar, messages) = take(jar);
        assert_eq!(
            messages,
            vec![
                "Registration successful!".to_string(),
                "Activity created successfully!".to_string()
            ]
        );
        assert_eq!(jar.get(FLASH_COOKIE).map(|cookie| cookie.value().to_string()), Some(String::new()));
    }

    #[test]
    fn unknown_codes_are_ignored() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "bogus.activity-deleted"));
        let (_, messages) = take(jar);
        assert_eq!(messages, vec!["Activity deleted successfully!".to_string()]);
    }

    #[test]
    fn empty_jar_has_no_messages() {
        let (_, messages) = take(CookieJar::new());
        assert!(messages.is_empty());
    }
}
