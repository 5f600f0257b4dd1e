//! Signed token issuance and verification
//!
//! HMAC-SHA256 tokens carrying the account identity. The signing secret and
//! token lifetime are injected at construction, never read from ambient
//! state, so instances and tests can run with independent secrets.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// The one algorithm the verifier trusts. Tokens declaring any other
/// algorithm are rejected regardless of signature validity.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims embedded in an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account id
    pub sub: i64,
    /// Subject's email address
    pub email: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// Token issuance and verification errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),

    #[error("malformed token")]
    Malformed,

    #[error("unexpected signing algorithm")]
    AlgorithmRejected,

    #[error("invalid token signature")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("system time error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),
}

/// Token signing configuration
///
/// The secret must be identical across every instance verifying the same
/// tokens; rotating it invalidates all outstanding tokens.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret key for HMAC signing (must be at least 256 bits)
    pub secret: String,
    /// Token lifetime in seconds
    pub ttl_secs: u64,
}

/// An issued token plus its absolute expiry for caller-facing display
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Unix seconds
    pub expires_at: i64,
}

/// Issues and verifies signed tokens under a single pinned algorithm.
#[derive(Clone)]
pub struct TokenCodec {
    config: TokenConfig,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Issue a token for the account, expiring `ttl_secs` from now.
    pub fn issue(&self, account_id: i64, email: &str) -> Result<IssuedToken, TokenError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        let claims = Claims {
            sub: account_id,
            email: email.to_string(),
            iat: now,
            exp: now + self.config.ttl_secs,
        };

        let token = encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(TokenError::Encoding)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp as i64,
        })
    }

    /// Verify a token and extract its claims.
    ///
    /// Failure order: unparseable structure, wrong algorithm, bad
    /// signature, expiry. `exp` must be strictly in the future.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::AlgorithmRejected
            }
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            _ => TokenError::Malformed,
        })?;

        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        if data.claims.exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str, ttl_secs: u64) -> TokenCodec {
        TokenCodec::new(TokenConfig {
            secret: secret.to_string(),
            ttl_secs,
        })
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let codec = codec("test-secret", 3600);

        let issued = codec.issue(42, "test@example.com").expect("issue failed");
        let claims = codec.verify(&issued.token).expect("verify failed");

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.exp as i64, issued.expires_at);
        assert!(issued.expires_at > claims.iat as i64);
    }

    #[test]
    fn test_malformed_token() {
        let codec = codec("test-secret", 3600);
        let result = codec.verify("not.a.token");
        assert!(matches!(result, Err(TokenError::Malformed)));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = codec("secret1", 3600);
        let verifier = codec("secret2", 3600);

        let issued = issuer.issue(1, "test@example.com").unwrap();
        let result = verifier.verify(&issued.token);

        assert!(matches!(result, Err(TokenError::SignatureInvalid)));
    }

    #[test]
    fn test_zero_ttl_token_is_expired() {
        let codec = codec("test-secret", 0);

        let issued = codec.issue(1, "test@example.com").unwrap();
        let result = codec.verify(&issued.token);

        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_past_expiry_token_is_expired() {
        let codec = codec("test-secret", 3600);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Expired an hour ago
        let claims = Claims {
            sub: 1,
            email: "test@example.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let result = codec.verify(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_algorithm_substitution_rejected() {
        let codec = codec("test-secret", 3600);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Validly signed under the same secret, but with HS384
        let claims = Claims {
            sub: 1,
            email: "test@example.com".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let result = codec.verify(&token);
        assert!(matches!(result, Err(TokenError::AlgorithmRejected)));
    }
}
