/**
 * Session Tokens
 *
 * This module signs and verifies the JWTs used for access and refresh
 * tokens. A signature alone does not authenticate a request: every token is
 * also persisted in the token store, and the middleware checks both.
 */

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT claims structure
///
/// `sub` and `user_id` decode as optional so a validly signed token that
/// lacks them can still be rejected with a precise reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User email
    #[serde(default)]
    pub sub: Option<String>,
    /// User ID (UUID string)
    #[serde(default)]
    pub user_id: Option<String>,
    /// Display name, present on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at time (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Random token id; keeps two tokens minted in the same second distinct
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    /// Claims for a user; `iat` and `exp` are filled in by `TokenCodec::sign`
    pub fn new(email: &str, user_id: Uuid) -> Self {
        Self {
            sub: Some(email.to_string()),
            user_id: Some(user_id.to_string()),
            name: None,
            iat: 0,
            exp: 0,
            jti: Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// Token verification failure
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("token expired")]
    Expired,

    /// Bad signature, bad structure or wrong algorithm
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// The authenticated caller of a protected request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
}

/// Signs and verifies JWTs with a shared secret
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sign claims, stamping `iat = issued_at` and `exp = issued_at + ttl`
    ///
    /// # Returns
    /// The signed token and its expiry instant
    pub fn sign(
        &self,
        mut claims: Claims,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), CodecError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| CodecError::Signing("token lifetime out of range".to_string()))?;
        claims.iat = issued_at.timestamp();
        claims.exp = expires_at.timestamp();

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| CodecError::Signing(e.to_string()))?;
        Ok((token, expires_at))
    }

    /// Verify signature, algorithm and expiry, and decode the claims
    pub fn verify(&self, token: &str) -> Result<Claims, CodecError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CodecError::Expired,
                _ => CodecError::Malformed(e.to_string()),
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
