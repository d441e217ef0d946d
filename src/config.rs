//! Configuration management

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Cognito identity provider configuration
    pub cognito: CognitoConfig,
    /// Document store configuration
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        // Load from file if provided
        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (TASKBOARD_ prefix)
        figment = figment.merge(Env::prefixed("TASKBOARD_").split("__"));

        figment.extract().map_err(|e| Error::Config(e.to_string()))
    }

    /// Validate that all startup-required settings are present.
    ///
    /// Missing identity-provider or database settings are fatal here, at
    /// process start, never at request time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing setting.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("cognito.user_pool_id", &self.cognito.user_pool_id),
            ("cognito.client_id", &self.cognito.client_id),
            ("cognito.region", &self.cognito.region),
            ("cognito.client_secret", &self.cognito.client_secret),
            ("database.url", &self.database.url),
        ];

        for (name, value) in required {
            if value.is_empty() {
                return Err(Error::Config(format!("{name} is not set")));
            }
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Cognito identity provider configuration.
///
/// `region`, `user_pool_id`, `client_id` and `client_secret` have no
/// defaults; [`Config::validate`] rejects a configuration that leaves any of
/// them empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CognitoConfig {
    /// AWS region of the user pool (e.g. `eu-central-1`)
    pub region: String,
    /// Cognito user pool id (e.g. `eu-central-1_AbCdEf123`)
    pub user_pool_id: String,
    /// App client id — also the expected `aud` claim of every token
    pub client_id: String,
    /// App client secret, keyed into the secret hash sent on password flows
    pub client_secret: String,
    /// Override for the identity provider API endpoint (tests, local stubs)
    pub endpoint: Option<String>,
    /// Override for the JWKS URL (tests, local stubs)
    pub jwks_uri: Option<String>,
    /// How long a fetched JWKS stays fresh before re-fetching
    #[serde(with = "humantime_serde")]
    pub jwks_cache_ttl: Duration,
}

impl Default for CognitoConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            user_pool_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            endpoint: None,
            jwks_uri: None,
            jwks_cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl CognitoConfig {
    /// The token issuer URL for this user pool — the expected `iss` claim.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    /// The JWKS URL: the configured override, or the well-known path under
    /// the issuer.
    #[must_use]
    pub fn jwks_uri(&self) -> String {
        self.jwks_uri
            .clone()
            .unwrap_or_else(|| format!("{}/.well-known/jwks.json", self.issuer()))
    }

    /// The identity provider API endpoint: the configured override, or the
    /// regional Cognito endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.region))
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string (e.g. `sqlite://taskboard.db`)
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
        }
    }
}

/// Custom humantime serde module for Duration
pub mod humantime_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serialize Duration to human-readable string (e.g., "30s")
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the serializer fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    /// Deserialize human-readable duration string (e.g., "30s", "5m", "100ms")
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the string cannot be parsed as a duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        // Parse "30s", "5m", etc.
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(serde::de::Error::custom)
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(serde::de::Error::custom)
        } else {
            // Assume seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        }
    }
}
