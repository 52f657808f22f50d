//! Argon2 password hashing adapter

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordVerifier};

use core_kernel::PortError;
use domain_access::PasswordHasher;

/// Argon2id implementation of the [`PasswordHasher`] port
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PortError> {
        let salt = SaltString::generate(&mut OsRng);
        argon2::PasswordHasher::hash_password(&Argon2::default(), password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PortError::internal(format!("password hashing failed: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PortError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| PortError::internal(format!("invalid hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PortError::internal(format!("verify error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("senha-secreta").unwrap();

        assert!(hasher.verify("senha-secreta", &hash).unwrap());
        assert!(!hasher.verify("senha-errada", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hasher = Argon2Hasher::new();
        assert!(hasher.verify("qualquer", "not-a-phc-hash").is_err());
    }
}
