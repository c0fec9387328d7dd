//! Process settings from environment (a `.env` file is loaded first when present).

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone, Debug)]
pub struct Settings {
    /// Path of the resource document. Env `RESOURCE_CONFIG`, default `resources.json`.
    pub resource_config: PathBuf,
    /// PostgreSQL URL. Env `DATABASE_URL`; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Env `BIND_ADDR`.
    pub bind_addr: SocketAddr,
    /// Env `BODY_LIMIT_BYTES`.
    pub body_limit_bytes: usize,
    /// Env `DEFAULT_PAGE_SIZE`.
    pub default_page_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            resource_config: PathBuf::from("resources.json"),
            database_url: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, crate::error::ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::error::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Settings::default();

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => v.parse().map_err(|e| invalid("BIND_ADDR", &v, e))?,
            None => defaults.bind_addr,
        };
        let body_limit_bytes = match get("BODY_LIMIT_BYTES") {
            Some(v) => v.parse().map_err(|e| invalid("BODY_LIMIT_BYTES", &v, e))?,
            None => defaults.body_limit_bytes,
        };
        let default_page_size = match get("DEFAULT_PAGE_SIZE") {
            Some(v) => v.parse().map_err(|e| invalid("DEFAULT_PAGE_SIZE", &v, e))?,
            None => defaults.default_page_size,
        };

        Ok(Settings {
            resource_config: get("RESOURCE_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.resource_config),
            database_url: get("DATABASE_URL"),
            bind_addr,
            body_limit_bytes,
            default_page_size,
        })
    }
}

fn invalid(key: &str, value: &str, err: impl std::fmt::Display) -> crate::error::ConfigError {
    crate::error::ConfigError::Load(format!("{}={}: {}", key, value, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, crate::error::ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(s.default_page_size, DEFAULT_PAGE_SIZE);
        assert!(s.database_url.is_none());
        assert_eq!(s.resource_config, PathBuf::from("resources.json"));
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("DATABASE_URL", "postgres://localhost/resources"),
            ("DEFAULT_PAGE_SIZE", "50"),
            ("RESOURCE_CONFIG", " demo.json "),
        ])
        .unwrap();
        assert_eq!(s.bind_addr.port(), 8080);
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/resources"));
        assert_eq!(s.default_page_size, 50);
        assert_eq!(s.resource_config, PathBuf::from("demo.json"));
    }

    #[test]
    fn empty_database_url_is_unset() {
        assert!(settings(&[("DATABASE_URL", "")]).unwrap().database_url.is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(settings(&[("BODY_LIMIT_BYTES", "lots")]).is_err());
    }
}
