//! Password hashing (argon2, PHC string format).

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SenhaError {
    #[error("salt generation failed: {0}")]
    Salt(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a plaintext password into a PHC string.
pub fn hash(senha: &str) -> Result<String, SenhaError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| SenhaError::Salt(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| SenhaError::Salt(e.to_string()))?;

    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(senha.as_bytes(), &salt)
        .map_err(|e| SenhaError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Verify a plaintext password against a stored PHC string.
///
/// An unparsable stored hash verifies as false, never as an error: a
/// corrupt record must not open the account.
pub fn verificar(hash: &str, senha: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(senha.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
