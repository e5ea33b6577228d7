use serde::Deserialize;

use super::{FormErrors, REQUIRED};
use crate::auth::password::MIN_PASSWORD_LEN;

const USERNAME_MAX_LEN: usize = 150;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::default();
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result(|| (username.to_string(), self.password.clone()))
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    /// Whether the username is free is checked by the auth service.
    pub fn validate(&self) -> Result<RegisterInput, FormErrors> {
        let mut errors = FormErrors::default();

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username.chars().count() > USERNAME_MAX_LEN {
            errors.add(
                "username",
                format!("Ensure this value has at most {USERNAME_MAX_LEN} characters."),
            );
        } else if !username.chars().all(is_username_char) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        let email = self.email.trim();
        if !email.is_empty() && !looks_like_email(email) {
            errors.add("email", "Enter a valid email address.");
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else if self.password1.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password1",
                format!(
                    "This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."
                ),
            );
        }

        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.into_result(|| RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password1.clone(),
        })
    }
}

fn is_username_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_')
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{LoginForm, RegisterForm};

    fn register_form() -> RegisterForm {
        RegisterForm {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password1: "password123".to_string(),
            password2: "password123".to_string(),
        }
    }

    #[test]
    fn register_accepts_valid_input() {
        let input = register_form().validate().expect("form should validate");
        assert_eq!(input.username, "alice");
        assert_eq!(input.email, "alice@example.com");
    }

    #[test]
    fn register_allows_blank_email() {
        let form = RegisterForm {
            email: String::new(),
            ..register_form()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn register_rejects_mismatch_short_password_and_bad_username() {
        let form = RegisterForm {
            username: "bad name!".to_string(),
            email: "nope".to_string(),
            password1: "short".to_string(),
            password2: "different".to_string(),
        };
        let errors = form.validate().expect_err("form should fail");

        assert!(errors.has("username"));
        assert!(errors.has("email"));
        assert!(errors.has("password1"));
        assert!(errors.has("password2"));
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm::default().validate().expect_err("form should fail");
        assert!(errors.has("username"));
        assert!(errors.has("password"));
    }
}
