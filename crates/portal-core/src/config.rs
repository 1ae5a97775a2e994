//! Portal configuration loaded from environment variables.
//!
//! All settings have defaults so the portal can start with zero
//! configuration for local development.

use std::path::PathBuf;
use std::time::Duration;

use portal_shared::constants::{
    APP_NAME, DEFAULT_CHAT_POLL_INTERVAL_MS, DEFAULT_PUBLIC_TESTIMONIAL_LIMIT,
};

/// Portal configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Database file.
    /// Env: `PORTAL_DB_PATH`
    /// Default: `None` (platform data directory, see `portal_store::database::default_path`).
    pub db_path: Option<PathBuf>,

    /// How often an open conversation is re-read.
    /// Env: `CHAT_POLL_INTERVAL_MS`
    /// Default: 2000 ms
    pub chat_poll_interval: Duration,

    /// Size of the public testimonial feed.
    /// Env: `PUBLIC_TESTIMONIAL_LIMIT`
    /// Default: 3
    pub public_testimonial_limit: usize,

    /// Human-readable name of this portal instance.
    /// Env: `INSTANCE_NAME`
    pub instance_name: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            chat_poll_interval: Duration::from_millis(DEFAULT_CHAT_POLL_INTERVAL_MS),
            public_testimonial_limit: DEFAULT_PUBLIC_TESTIMONIAL_LIMIT,
            instance_name: APP_NAME.to_string(),
        }
    }
}

impl PortalConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("PORTAL_DB_PATH") {
            if !path.trim().is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("CHAT_POLL_INTERVAL_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => config.chat_poll_interval = Duration::from_millis(ms),
                _ => tracing::warn!(value = %val, "Invalid CHAT_POLL_INTERVAL_MS, using default"),
            }
        }

        if let Some(val) = lookup("PUBLIC_TESTIMONIAL_LIMIT") {
            match val.parse::<usize>() {
                Ok(n) => config.public_testimonial_limit = n,
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid PUBLIC_TESTIMONIAL_LIMIT, using default")
                }
            }
        }

        if let Some(name) = lookup("INSTANCE_NAME") {
            config.instance_name = name;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> PortalConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PortalConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = from_pairs(&[]);
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.chat_poll_interval, Duration::from_millis(2000));
        assert_eq!(config.public_testimonial_limit, 3);
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PORTAL_DB_PATH", "/tmp/portal.db"),
            ("CHAT_POLL_INTERVAL_MS", "250"),
            ("PUBLIC_TESTIMONIAL_LIMIT", "5"),
            ("INSTANCE_NAME", "Test Portal"),
        ]);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/portal.db")));
        assert_eq!(config.chat_poll_interval, Duration::from_millis(250));
        assert_eq!(config.public_testimonial_limit, 5);
        assert_eq!(config.instance_name, "Test Portal");
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = from_pairs(&[
            ("CHAT_POLL_INTERVAL_MS", "0"),
            ("PUBLIC_TESTIMONIAL_LIMIT", "many"),
        ]);
        assert_eq!(config.chat_poll_interval, Duration::from_millis(2000));
        assert_eq!(config.public_testimonial_limit, 3);
    }
}
