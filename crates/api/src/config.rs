//! Application configuration loaded from environment variables.

use lifecycle::{AmqpConfig, KeycloakConfig};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL URL; the in-memory store is used when unset
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `KEYCLOAK_URL`, `KEYCLOAK_REALM`, `KEYCLOAK_CLIENT_ID`,
///   `KEYCLOAK_CLIENT_SECRET`, `KEYCLOAK_ADMIN_USERNAME`,
///   `KEYCLOAK_ADMIN_PASSWORD`, `USER_DETAILS_URL`: identity provider
/// - `AMQP_URL`, `NOTIFICATION_QUEUE`: message broker
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub keycloak: KeycloakConfig,
    pub amqp: AmqpConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    ///
    /// Empty values count as unset, except for the Keycloak credentials which
    /// default to empty anyway.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: var("DATABASE_URL"),
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
            keycloak: KeycloakConfig {
                base_url: var("KEYCLOAK_URL").unwrap_or(defaults.keycloak.base_url),
                realm: var("KEYCLOAK_REALM").unwrap_or(defaults.keycloak.realm),
                client_id: var("KEYCLOAK_CLIENT_ID").unwrap_or(defaults.keycloak.client_id),
                client_secret: lookup("KEYCLOAK_CLIENT_SECRET").unwrap_or_default(),
                admin_username: lookup("KEYCLOAK_ADMIN_USERNAME").unwrap_or_default(),
                admin_password: lookup("KEYCLOAK_ADMIN_PASSWORD").unwrap_or_default(),
                user_details_url: var("USER_DETAILS_URL")
                    .unwrap_or(defaults.keycloak.user_details_url),
                ..defaults.keycloak
            },
            amqp: AmqpConfig {
                url: var("AMQP_URL").unwrap_or(defaults.amqp.url),
                queue: var("NOTIFICATION_QUEUE").unwrap_or(defaults.amqp.queue),
                ..defaults.amqp
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 5,
            keycloak: KeycloakConfig::default(),
            amqp: AmqpConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.keycloak.realm, "my-realm");
        assert_eq!(config.keycloak.client_id, "kong");
        assert_eq!(config.amqp.queue, "generate_contract");
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_addr_default() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_reads_overrides() {
        let config = from_pairs(&[
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://u:p@db/rentals"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("KEYCLOAK_URL", "http://kc:8080"),
            ("KEYCLOAK_REALM", "rentals"),
            ("KEYCLOAK_CLIENT_SECRET", "s3cret"),
            ("USER_DETAILS_URL", "http://users/user/user-details"),
            ("AMQP_URL", "amqp://rabbit:5672/%2f"),
            ("NOTIFICATION_QUEUE", "contracts"),
        ]);

        assert_eq!(config.port, 9000);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://u:p@db/rentals")
        );
        assert_eq!(config.database_max_connections, 20);
        assert_eq!(config.keycloak.base_url, "http://kc:8080");
        assert_eq!(config.keycloak.realm, "rentals");
        assert_eq!(config.keycloak.client_secret, "s3cret");
        assert_eq!(config.keycloak.user_details_url, "http://users/user/user-details");
        assert_eq!(config.amqp.url, "amqp://rabbit:5672/%2f");
        assert_eq!(config.amqp.queue, "contracts");
    }

    #[test]
    fn test_empty_and_invalid_values_fall_back() {
        let config = from_pairs(&[("PORT", "not-a-port"), ("DATABASE_URL", ""), ("HOST", " ")]);
        assert_eq!(config.port, 8000);
        assert!(config.database_url.is_none());
        assert_eq!(config.host, "0.0.0.0");
    }
}
