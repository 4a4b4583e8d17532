//! Token configuration.

use chrono::Duration;

/// Bearer token settings.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC key used to sign tokens.
    pub secret: Vec<u8>,

    /// Lifetime of an issued token.
    ///
    /// Default: 1 hour
    pub ttl: Duration,
}

impl TokenConfig {
    /// Create a configuration with the default lifetime.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(1),
        }
    }

    /// Set token lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
