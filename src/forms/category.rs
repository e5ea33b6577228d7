use serde::Deserialize;

use super::{FormErrors, REQUIRED};
use crate::db::entities::category::{DEFAULT_COLOR, NAME_MAX_LEN};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub description: String,
    pub color: String,
}

impl CategoryForm {
    pub fn initial() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            ..Default::default()
        }
    }

    /// Name uniqueness is checked by the service.
    pub fn validate(&self) -> Result<CategoryInput, FormErrors> {
        let mut errors = FormErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", REQUIRED);
        } else if name.chars().count() > NAME_MAX_LEN {
            errors.add(
                "name",
                format!("Ensure this value has at most {NAME_MAX_LEN} characters."),
            );
        }

        let color = match self.color.trim() {
            "" => DEFAULT_COLOR.to_string(),
            raw if is_hex_color(raw) => raw.to_ascii_lowercase(),
            _ => {
                errors.add("color", "Enter a hex color such as #007bff.");
                String::new()
            }
        };

        errors.into_result(|| CategoryInput {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            color,
        })
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|ch| ch.is_ascii_hexdigit())
}
