//! # Application Configuration
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. An optional YAML file
//! 3. Environment variables (`BABY_TRACKER_BIND_ADDRESS`,
//!    `BABY_TRACKER_DATABASE_URL`)
//!
//! ## YAML Format
//!
//! ```yaml
//! bind_address: "0.0.0.0:3000"
//! database_url: "sqlite:baby_tracker.db"
//! max_connections: 5
//! log_filter: "info"
//! cors_origins:
//!   - "http://localhost:8080"
//! migrate_legacy_on_startup: false
//! identity:
//!   user_id_claims: ["oid", "sub"]
//!   email_claims: ["email", "preferred_username", "upn"]
//! invitations:
//!   ttl_days: 7
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::identity::IdentityResolver;
use crate::domain::invitation_service::DEFAULT_INVITATION_TTL_DAYS;
use crate::storage::connection::DEFAULT_DATABASE_URL;

pub const BIND_ADDRESS_ENV: &str = "BABY_TRACKER_BIND_ADDRESS";
pub const DATABASE_URL_ENV: &str = "BABY_TRACKER_DATABASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_url: String,
    pub max_connections: u32,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Allowed browser origins; empty allows any origin
    pub cors_origins: Vec<String>,
    pub migrate_legacy_on_startup: bool,
    pub identity: IdentityConfig,
    pub invitations: InvitationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            log_filter: "info".to_string(),
            cors_origins: Vec::new(),
            migrate_legacy_on_startup: false,
            identity: IdentityConfig::default(),
            invitations: InvitationConfig::default(),
        }
    }
}

/// Claim names read from the bearer token, in lookup order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub user_id_claims: Vec<String>,
    pub email_claims: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_id_claims: vec!["oid".to_string(), "sub".to_string()],
            email_claims: vec![
                "email".to_string(),
                "preferred_username".to_string(),
                "upn".to_string(),
            ],
        }
    }
}

impl IdentityConfig {
    pub fn resolver(&self) -> IdentityResolver {
        IdentityResolver::new(self.user_id_claims.clone(), self.email_claims.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvitationConfig {
    pub ttl_days: i64,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            ttl_days: DEFAULT_INVITATION_TTL_DAYS,
        }
    }
}

impl InvitationConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.ttl_days)
    }
}

impl AppConfig {
    /// Load from `path` when given, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };

        Ok(config.apply_overrides(|name| std::env::var(name).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: AppConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Replace settings for which `lookup` returns a non-empty value
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(bind_address) = lookup(BIND_ADDRESS_ENV) {
            debug!("Bind address overridden by {}", BIND_ADDRESS_ENV);
            self.bind_address = bind_address;
        }
        if let Some(database_url) = lookup(DATABASE_URL_ENV) {
            debug!("Database URL overridden by {}", DATABASE_URL_ENV);
            self.database_url = database_url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.invitations.ttl_days, 7);
        assert_eq!(config.identity.user_id_claims, vec!["oid", "sub"]);
        assert!(!config.migrate_legacy_on_startup);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bind_address: \"127.0.0.1:8088\"\ninvitations:\n  ttl_days: 3\ncors_origins:\n  - \"http://localhost:8080\""
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8088");
        assert_eq!(config.invitations.ttl_days, 3);
        assert_eq!(config.cors_origins, vec!["http://localhost:8080"]);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.identity, IdentityConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_connections: [not, a, number]").unwrap();

        assert!(AppConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (DATABASE_URL_ENV, "sqlite::memory:"),
            (BIND_ADDRESS_ENV, "  "),
        ]);

        let config = AppConfig::default().apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_address, AppConfig::default().bind_address);
    }
}
