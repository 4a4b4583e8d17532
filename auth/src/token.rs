//! HS256 bearer tokens.
//!
//! Tokens are compact JWTs: `base64url(header).base64url(claims).base64url(mac)`
//! where `mac` is HMAC-SHA256 over the first two segments. Only the `HS256`
//! algorithm is accepted.

use crate::config::TokenConfig;
use crate::error::{AuthError, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use pet_adoption_core::model::UserId;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// Issued at (seconds since the epoch)
    pub iat: i64,
    /// Expires at (seconds since the epoch)
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a shared secret.
#[derive(Clone, Debug)]
pub struct TokenSigner {
    config: TokenConfig,
}

impl TokenSigner {
    /// Create a signer from configuration
    #[must_use]
    pub const fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Issue a token for `user_id` valid from `now` for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hashing`] if the claims cannot be encoded.
    pub fn issue(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<String> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            user_id: user_id.clone(),
            iat: now.timestamp(),
            exp: (now + self.config.ttl).timestamp(),
        };

        let header = encode_segment(&header)?;
        let claims = encode_segment(&claims)?;
        let signing_input = format!("{header}.{claims}");
        let signature = URL_SAFE_NO_PAD.encode(self.mac(signing_input.as_bytes())?);

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the token is malformed, uses
    /// another algorithm, carries a bad signature, or has expired at `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        let signing_input = &token[..header.len() + 1 + claims.len()];
        let expected = self.mac(signing_input.as_bytes())?;
        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;
        if !constant_time_eq::constant_time_eq(&expected, &provided) {
            tracing::debug!("Token signature mismatch");
            return Err(AuthError::InvalidToken);
        }

        let header: Header = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::InvalidToken);
        }

        let claims: Claims = decode_segment(claims)?;
        if now.timestamp() >= claims.exp {
            tracing::debug!(user_id = %claims.user_id, "Token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    fn mac(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.config.secret)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pet_adoption_testing::test_clock;

    fn signer(secret: &str) -> TokenSigner {
        TokenSigner::new(TokenConfig::new(secret))
    }

    #[test]
    fn issued_token_verifies() {
        let now = test_clock().time();
        let s = signer("secret");
        let token = s.issue(&UserId::new("u1"), now).unwrap();

        let claims = s.verify(&token, now + Duration::minutes(59)).unwrap();
        assert_eq!(claims.user_id, UserId::new("u1"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = test_clock().time();
        let s = signer("secret");
        let token = s.issue(&UserId::new("u1"), now).unwrap();
        assert_eq!(
            s.verify(&token, now + Duration::hours(1)),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn other_secret_is_rejected() {
        let now = test_clock().time();
        let token = signer("a").issue(&UserId::new("u1"), now).unwrap();
        assert_eq!(signer("b").verify(&token, now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let now = test_clock().time();
        let s = signer("secret");
        let token = s.issue(&UserId::new("u1"), now).unwrap();
        let forged_claims = encode_segment(&Claims {
            user_id: UserId::new("admin"),
            iat: now.timestamp(),
            exp: now.timestamp() + 3600,
        })
        .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{forged_claims}.{}", parts[0], parts[2]);
        assert_eq!(s.verify(&forged, now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let s = signer("secret");
        let now = test_clock().time();
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert_eq!(s.verify(token, now), Err(AuthError::InvalidToken), "{token}");
        }
    }

    #[test]
    fn claims_use_user_id_key() {
        let json = serde_json::to_value(Claims {
            user_id: UserId::new("u1"),
            iat: 1,
            exp: 2,
        })
        .unwrap();
        assert_eq!(json["userId"], "u1");
    }
}
