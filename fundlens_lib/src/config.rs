//! Runtime settings: an optional TOML file overridden by `FUNDLENS_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::pagination::{PaginationConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const DEFAULT_DATABASE_PATH: &str = "fundlens.db";
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 10;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_path: PathBuf,
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Page size used per category by unified search.
    pub search_page_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            search_page_size: DEFAULT_SEARCH_PAGE_SIZE,
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                    path: p.to_path_buf(),
                    source,
                })?;
                Settings::from_toml_str(&content)?
            }
            None => Settings::default(),
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `FUNDLENS_*` overrides read through `lookup`, then validate.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = lookup("FUNDLENS_DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(v) = lookup("FUNDLENS_DEFAULT_PAGE_SIZE") {
            self.default_page_size = parse_size("FUNDLENS_DEFAULT_PAGE_SIZE", &v)?;
        }
        if let Some(v) = lookup("FUNDLENS_MAX_PAGE_SIZE") {
            self.max_page_size = parse_size("FUNDLENS_MAX_PAGE_SIZE", &v)?;
        }
        if let Some(v) = lookup("FUNDLENS_SEARCH_PAGE_SIZE") {
            self.search_page_size = parse_size("FUNDLENS_SEARCH_PAGE_SIZE", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("default_page_size", self.default_page_size),
            ("max_page_size", self.max_page_size),
            ("search_page_size", self.search_page_size),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must be >= 1".into(),
                });
            }
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid {
                key: "default_page_size",
                reason: format!(
                    "{} exceeds max_page_size {}",
                    self.default_page_size, self.max_page_size
                ),
            });
        }
        Ok(())
    }

    pub fn pagination(&self) -> PaginationConfig {
        PaginationConfig {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }
}

fn parse_size(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("'{}': {}", raw, e),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let s = Settings::default().with_env(env(&[])).unwrap();
        assert_eq!(s.default_page_size, 50);
        assert_eq!(s.max_page_size, 1000);
        assert_eq!(s.search_page_size, 10);
    }

    #[test]
    fn toml_partial_keeps_defaults() {
        let s = Settings::from_toml_str("max_page_size = 200\n").unwrap();
        assert_eq!(s.max_page_size, 200);
        assert_eq!(s.default_page_size, 50);
    }

    #[test]
    fn env_overrides_file() {
        let s = Settings::from_toml_str("database_path = \"a.db\"\n")
            .unwrap()
            .with_env(env(&[
                ("FUNDLENS_DATABASE_PATH", "b.db"),
                ("FUNDLENS_DEFAULT_PAGE_SIZE", "25"),
            ]))
            .unwrap();
        assert_eq!(s.database_path, PathBuf::from("b.db"));
        assert_eq!(s.pagination().default_page_size, 25);
    }

    #[test]
    fn non_numeric_env_is_error() {
        let err = Settings::default()
            .with_env(env(&[("FUNDLENS_MAX_PAGE_SIZE", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FUNDLENS_MAX_PAGE_SIZE", .. }));
    }

    #[test]
    fn default_above_max_is_error() {
        let err = Settings::default()
            .with_env(env(&[("FUNDLENS_MAX_PAGE_SIZE", "10")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "default_page_size", .. }));
    }

    #[test]
    fn bad_toml_is_error() {
        assert!(matches!(
            Settings::from_toml_str("max_page_size = \"x\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
