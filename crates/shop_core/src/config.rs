//! Runtime configuration for catalog binaries.
//!
//! Values come from `SHOP_*` environment variables; blank values fall back to
//! defaults.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "SHOP_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "SHOP_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "SHOP_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "shop.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    /// SQLite catalog file.
    pub database_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Rolling log directory. Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl ShopConfig {
    /// Builds a config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let defaults = Self::default();
        Self {
            database_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_level: value(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: value(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            database_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ShopConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ShopConfig::from_lookup(|_| None);
        assert_eq!(config, ShopConfig::default());
        assert!(config.database_path.ends_with("shop.sqlite3"));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn blank_values_fall_back_and_set_values_win() {
        let env: HashMap<&str, &str> = [
            (DB_PATH_ENV, "  /var/lib/shop/catalog.db "),
            (LOG_LEVEL_ENV, "   "),
            (LOG_DIR_ENV, "/var/log/shop"),
        ]
        .into_iter()
        .collect();

        let config = ShopConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.database_path, PathBuf::from("/var/lib/shop/catalog.db"));
        assert_eq!(config.log_level, ShopConfig::default().log_level);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/shop")));
    }
}
