//! Configuration management for the pet adoption API.
//!
//! Loads configuration from environment variables (after `.env` is read by
//! the binary) with defaults suitable for local development.
//!
//! | Variable | Default |
//! |---|---|
//! | `HOST` / `PORT` | `0.0.0.0` / `3000` |
//! | `REQUEST_TIMEOUT_SECS` | `10` |
//! | `METRICS_PORT` | `9090` |
//! | `DATABASE_URL` | unset: in-memory stores |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |
//! | `DATABASE_ACQUIRE_TIMEOUT_SECS` | `5` |
//! | `JWT_SECRET` | required unless `APP_ENV` is `development` or unset |
//! | `JWT_TTL_SECS` | `3600` |
//! | `APP_ENV` | unset (development) |
//! | `FRONTEND_URL` | appended to the CORS allow-list |

use pet_adoption_auth::TokenConfig;
use pet_adoption_web::CorsPolicy;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Secret used when running in development without `JWT_SECRET`.
const DEVELOPMENT_JWT_SECRET: &str = "development-only-secret";

/// Browser origins always allowed to call the API.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:4200",
    "http://localhost:3000",
    "https://petadoptionsystem-820a5.web.app",
    "https://petadoptionsystem-820a5.firebaseapp.com",
];

/// Configuration loading errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {key}: {value:?}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
    },

    /// `JWT_SECRET` missing outside development.
    #[error("JWT_SECRET must be set when APP_ENV is {0:?}")]
    MissingJwtSecret(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Token settings
    pub auth: AuthConfig,
    /// Browser access
    pub cors: CorsConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Upper bound on how long a handler waits for the adoption workflow
    pub request_timeout: Duration,
    /// Prometheus scrape port
    pub metrics_port: u16,
}

impl ServerConfig {
    /// Address for the API listener.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `HOST` is not an IP address.
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        self.socket(self.port)
    }

    /// Address for the metrics listener.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `HOST` is not an IP address.
    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.socket(self.metrics_port)
    }

    fn socket(&self, port: u16) -> Result<SocketAddr, ConfigError> {
        format!("{}:{port}", self.host)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                key: "HOST",
                value: self.host.clone(),
            })
    }
}

/// Database settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` URL; `None` selects the in-memory stores
    pub url: Option<String>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// How long a query waits for a pooled connection
    pub acquire_timeout: Duration,
}

/// Token settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for bearer tokens
    pub jwt_secret: String,
    /// Token lifetime
    pub token_ttl: Duration,
}

impl AuthConfig {
    /// Token signer configuration.
    #[must_use]
    pub fn token_config(&self) -> TokenConfig {
        let ttl = chrono::Duration::from_std(self.token_ttl).unwrap_or(chrono::Duration::hours(1));
        TokenConfig::new(self.jwt_secret.as_bytes()).with_ttl(ttl)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Browser access settings.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Deployment environment name (`APP_ENV`)
    pub environment: Option<String>,
    /// Exact origins allowed outside development
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Development when `APP_ENV` is unset or `development`.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment
            .as_deref()
            .is_none_or(|env| env.is_empty() || env == "development")
    }

    /// CORS policy for the router.
    #[must_use]
    pub fn policy(&self) -> CorsPolicy {
        if self.is_development() {
            CorsPolicy::permissive()
        } else {
            CorsPolicy::new(self.allowed_origins.iter().cloned())
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Invalid`] for unparseable numbers
    /// - [`ConfigError::MissingJwtSecret`] outside development
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cors = CorsConfig {
            environment: var("APP_ENV"),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(ToString::to_string)
                .chain(var("FRONTEND_URL"))
                .collect(),
        };

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if cors.is_development() => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            },
            None => {
                return Err(ConfigError::MissingJwtSecret(
                    cors.environment.clone().unwrap_or_default(),
                ));
            },
        };

        Ok(Self {
            server: ServerConfig {
                host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&var, "PORT", 3000)?,
                request_timeout: Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECS", 10)?),
                metrics_port: parse_or(&var, "METRICS_PORT", 9090)?,
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL"),
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout: Duration::from_secs(parse_or(
                    &var,
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    5,
                )?),
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl: Duration::from_secs(parse_or(&var, "JWT_TTL_SECS", 3600)?),
            },
            cors,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_for_local_development() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout, Duration::from_secs(10));
        assert!(config.database.url.is_none());
        assert_eq!(config.auth.token_ttl, Duration::from_secs(3600));
        assert!(config.cors.is_development());
        assert!(config.cors.policy().allow_any);
        assert_eq!(config.server.addr().unwrap().port(), 3000);
    }

    #[test]
    fn production_requires_secret() {
        assert_eq!(
            load(&[("APP_ENV", "production")]).unwrap_err(),
            ConfigError::MissingJwtSecret("production".into())
        );
    }

    #[test]
    fn production_cors_is_an_allow_list() {
        let config = load(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "s3cret"),
            ("FRONTEND_URL", "https://pets.example"),
        ])
        .unwrap();

        let policy = config.cors.policy();
        assert!(!policy.allow_any);
        assert!(policy.allows("https://pets.example"));
        assert!(policy.allows("http://localhost:4200"));
        assert!(!policy.allows("https://evil.example"));
    }

    #[test]
    fn invalid_numbers_are_reported() {
        assert_eq!(
            load(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".into()
            }
        );
    }

    #[test]
    fn secret_is_redacted() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert!(!format!("{:?}", config.auth).contains("s3cret"));
    }
}
