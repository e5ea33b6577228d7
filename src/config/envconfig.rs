use std::{collections::HashMap, path::Path};

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Configuration read from `APP_`-prefixed environment variables, with `__`
/// separating nested sections (`APP_AUTH__JWT_SECRET` -> `auth.jwt_secret`).
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";

    /// `.env` next to the manifest wins over one in the working directory.
    fn load_dotenv() {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn environment() -> config_rs::Environment {
        config_rs::Environment::with_prefix(Self::PREFIX)
            .prefix_separator("_")
            .separator(Self::SEPARATOR)
            .try_parsing(true)
    }

    fn from_env() -> Result<Self> {
        Self::load_dotenv();
        Self::build(Self::environment())
    }

    /// Same as [`EnvConfig::from_env`] but reads `vars` instead of the
    /// process environment.
    fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::build(Self::environment().source(Some(vars)))
    }

    fn build(source: config_rs::Environment) -> Result<Self> {
        let settings = config_rs::Config::builder()
            .add_source(source)
            .build()
            .context("failed to read environment variables for config")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize environment into config")?;

        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::EnvConfig;
    use crate::config::AppConfig;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = AppConfig::from_vars(HashMap::new()).expect("defaults should load");
        assert_eq!(cfg.general.host, "127.0.0.1");
        assert_eq!(cfg.general.port, 3000);
        assert!(cfg.database.is_none());
        assert!(cfg.auth.is_none());
    }

    #[test]
    fn nested_sections_are_read_from_double_underscores() {
        let cfg = AppConfig::from_vars(vars(&[
            ("APP_GENERAL__PORT", "8081"),
            ("APP_DATABASE__URL", "sqlite::memory:"),
            ("APP_DATABASE__MAX_CONNECTIONS", "1"),
            ("APP_DATABASE__MIN_IDLE", "1"),
            ("APP_AUTH__JWT_SECRET", "secret"),
            ("APP_AUTH__ADMIN_PASSWORD", "adminpassword"),
        ]))
        .expect("config should load");

        assert_eq!(cfg.general.port, 8081);
        let database = cfg.database.expect("database section");
        assert_eq!(database.url, "sqlite::memory:");
        assert_eq!(database.max_connections, 1);
        let auth = cfg.auth.expect("auth section");
        assert_eq!(auth.admin_username, "admin");
        assert_eq!(auth.session_ttl_secs, 12 * 60 * 60);
    }

    #[test]
    fn invalid_values_fail_validation() {
        let err = AppConfig::from_vars(vars(&[
            ("APP_AUTH__JWT_SECRET", "secret"),
            ("APP_AUTH__ADMIN_PASSWORD", "short"),
        ]))
        .expect_err("short admin password should be rejected");
        assert!(format!("{err:#}").contains("admin_password"), "{err:#}");
    }
}
