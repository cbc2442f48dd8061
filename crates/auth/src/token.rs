//! Bearer credential verification.
//!
//! Any verification failure is an explicit [`AuthError`]; it is never
//! silently downgraded to "anonymous". The call site is responsible for
//! distinguishing "no credential presented" from "credential presented but
//! invalid"; only the former may proceed as anonymous.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

/// Authentication failure. Always surfaced as a 401-equivalent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("invalid token")]
    InvalidToken,

    #[error("{0}")]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and produces its claims.
///
/// Implementations own signature verification; the deterministic claim
/// checks (expiry, issuance window) are shared via [`validate_claims`].
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError>;
}

/// HS256 signer/verifier over a shared secret.
pub struct Hs256Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256Tokens {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a set of claims into a compact token.
    pub fn mint(&self, claims: &JwtClaims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| AuthError::InvalidToken)
    }
}

impl TokenVerifier for Hs256Tokens {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError> {
        // Time-window checks run through validate_claims so they stay
        // deterministic and testable; the library only checks the signature.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|_| AuthError::InvalidToken)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
