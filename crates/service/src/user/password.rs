//! Argon2 password hashing.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand::rngs::OsRng;

use crate::errors::ServiceError;

/// Hashes new passwords and verifies stored PHC strings.
///
/// Verification reads the parameters embedded in the stored hash, so hashes
/// produced with different cost settings stay verifiable.
#[derive(Clone, Default)]
pub struct Hasher {
    argon: Argon2<'static>,
}

impl Hasher {
    /// Custom cost parameters (memory KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, ServiceError> {
        let params = Params::new(m_cost, t_cost, p_cost, None).map_err(|e| ServiceError::Hash(e.to_string()))?;
        Ok(Self { argon: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params) })
    }

    pub fn hash(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ServiceError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(stored).map_err(|e| ServiceError::Hash(e.to_string()))?;
        Ok(self.argon.verify_password(password.as_bytes(), &parsed).is_ok())
    }
}
