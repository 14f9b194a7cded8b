// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential signing and parsing.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{TokenClaims, TokenKind};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// JwtConfig
// =============================================================================

/// Token signing configuration.
///
/// The secret is always supplied by the embedding application; it is never
/// looked up from the process environment.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Shared signing secret.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Lifetime of session tokens.
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,
    /// Lifetime of API keys.
    #[serde(with = "humantime_serde")]
    pub api_key_ttl: Duration,
    /// HMAC algorithm used for signing.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "ward".to_string(),
            session_ttl: Duration::from_secs(60 * 60),
            api_key_ttl: Duration::from_secs(4380 * 60 * 60),
            algorithm: Algorithm::HS256,
            leeway_secs: 0,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the session token lifetime.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Sets the API key lifetime.
    pub fn with_api_key_ttl(mut self, ttl: Duration) -> Self {
        self.api_key_ttl = ttl;
        self
    }

    /// Returns the lifetime for `kind`.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Session => self.session_ttl,
            TokenKind::Api => self.api_key_ttl,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::validation("token secret is not configured"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("Token secret is shorter than recommended (32 bytes)");
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ApiError::validation(
                "token algorithm must be an HMAC algorithm",
            ));
        }
        if self.session_ttl.is_zero() || self.api_key_ttl.is_zero() {
            return Err(ApiError::validation("token lifetimes must be positive"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("session_ttl", &self.session_ttl)
            .field("api_key_ttl", &self.api_key_ttl)
            .field("algorithm", &self.algorithm)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

// =============================================================================
// TokenCodec
// =============================================================================

/// Signs and parses credentials with the configured secret.
#[derive(Clone)]
pub struct TokenCodec {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenCodec {
    /// Creates a codec from the given configuration.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Returns the codec configuration.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Signs `claims`, stamping the configured issuer.
    pub fn encode(&self, claims: &TokenClaims) -> ApiResult<String> {
        let claims = claims.clone().with_issuer(&self.config.issuer);
        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("failed to sign token: {}", e)))
    }

    /// Verifies signature, issuer and expiry and returns the claims.
    pub fn decode(&self, token: &str) -> ApiResult<TokenClaims> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)?;
        let now = chrono::Utc::now().timestamp() - self.config.leeway_secs as i64;
        if claims.is_expired_at(now) {
            return Err(ApiError::unauthenticated("token has expired"));
        }
        Ok(claims)
    }

    /// Verifies signature and issuer but accepts expired tokens.
    pub fn decode_allow_expired(&self, token: &str) -> ApiResult<TokenClaims> {
        let mut validation = (*self.validation).clone();
        validation.validate_exp = false;
        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .finish()
    }
}

/// Returns the signature segment of a compact token.
pub fn token_signature(token: &str) -> Option<&str> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(_), Some(sig), None) if !sig.is_empty() => Some(sig),
        _ => None,
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> ApiError {
    use jsonwebtoken::errors::ErrorKind;

    match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::unauthenticated("token has expired"),
        ErrorKind::InvalidSignature => ApiError::unauthenticated("invalid token signature"),
        ErrorKind::InvalidIssuer => ApiError::unauthenticated("invalid token issuer"),
        ErrorKind::Json(_) => ApiError::unauthenticated("invalid token claims"),
        _ => ApiError::unauthenticated("invalid token"),
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            _ => "HS256",
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "unsupported algorithm: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
