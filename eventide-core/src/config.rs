use std::env;

use crate::errors::{ConfigError, EventideError};

/// Runtime environment used by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

/// Global configuration shared across the services.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub environment: Environment,
    pub node_name: String,
    pub http_bind: Option<String>,
    pub max_feed_items: Option<usize>,
    pub seed_demo: bool,
}

impl CoreConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with_prefix("EVENTIDE_")
    }

    /// Loads configuration from env vars prefixed with the provided value (e.g. `TIMELINE_`).
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);

        let env_key = key("ENV");
        let environment = env::var(&env_key)
            .map(|raw| Environment::from_str(&raw))
            .unwrap_or_default();

        let node_key = key("NODE_NAME");
        let node_name = env::var(&node_key).unwrap_or_else(|_| "eventide-node".to_string());

        let bind_key = key("HTTP_BIND");
        let http_bind = env::var(&bind_key).ok();

        let items_key = key("MAX_FEED_ITEMS");
        let max_feed_items = match env::var(&items_key) {
            Ok(raw) => Some(raw.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                key: items_key,
                value: raw,
            })?),
            Err(_) => None,
        };

        let seed_key = key("SEED_DEMO");
        let seed_demo = env::var(&seed_key)
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            environment,
            node_name,
            http_bind,
            max_feed_items,
            seed_demo,
        })
    }

    /// Whether the service is running in production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

/// Helper that loads config and converts to the canonical Eventide error type.
pub fn load_core_config() -> Result<CoreConfig, EventideError> {
    Ok(CoreConfig::from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_when_unset() {
        std::env::remove_var("TEST_ENV");
        std::env::remove_var("TEST_NODE_NAME");
        std::env::remove_var("TEST_MAX_FEED_ITEMS");
        let cfg = CoreConfig::from_env_with_prefix("TEST_").expect("config should load");
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.node_name, "eventide-node");
        assert_eq!(cfg.max_feed_items, None);
        assert!(!cfg.seed_demo);
    }

    #[test]
    fn rejects_malformed_feed_limit() {
        std::env::set_var("BROKEN_MAX_FEED_ITEMS", "lots");
        let err = CoreConfig::from_env_with_prefix("BROKEN_").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        std::env::remove_var("BROKEN_MAX_FEED_ITEMS");
    }

    #[test]
    fn parses_environment_aliases() {
        std::env::set_var("ALIAS_ENV", "prod");
        let cfg = CoreConfig::from_env_with_prefix("ALIAS_").expect("config should load");
        assert!(cfg.is_production());
        std::env::remove_var("ALIAS_ENV");
    }
}
