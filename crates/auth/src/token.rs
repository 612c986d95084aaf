//! HS256 bearer-token codec.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use sweetshop_core::UserId;

use crate::{validate_claims, AuthConfig, JwtClaims, Role, TokenValidationError};

/// Token response handed back by login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: i64,
}

/// Issues and verifies HS256 tokens with a single shared secret.
#[derive(Clone)]
pub struct Hs256JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256JwtCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        // Expiry is checked by `validate_claims` against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims =
            ["exp", "sub"].into_iter().map(String::from).collect::<HashSet<_>>();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: config.token_ttl,
        }
    }

    pub fn issue(
        &self,
        subject: UserId,
        role: Role,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, jsonwebtoken::errors::Error> {
        let claims = JwtClaims::new(subject, role, name, now, now + self.ttl);
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(AccessToken {
            access_token: token,
            token_type: "bearer",
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Verify signature and structure, then the time window.
    pub fn validate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<JwtClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenValidationError::BadSignature,
                ErrorKind::InvalidAlgorithm => TokenValidationError::AlgorithmMismatch,
                ErrorKind::ExpiredSignature => TokenValidationError::Expired,
                _ => TokenValidationError::Malformed(e.to_string()),
            })?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
