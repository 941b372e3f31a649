//! Password hashing behind the `PasswordService` port.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use gazette_core::ports::{AuthError, PasswordService};

/// Argon2id with the library defaults. Stateless: every hash is a PHC
/// string embedding its own salt and parameters, so verification needs
/// no configuration.
#[derive(Default)]
pub struct Argon2PasswordService;

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_the_original_password_only() {
        let service = Argon2PasswordService::new();

        let hash = service.hash("correct-horse").unwrap();
        assert!(service.verify("correct-horse", &hash).unwrap());
        assert!(!service.verify("battery-staple", &hash).unwrap());
    }

    #[test]
    fn salts_make_repeated_hashes_distinct() {
        let service = Argon2PasswordService::new();

        let first = service.hash("correct-horse").unwrap();
        let second = service.hash("correct-horse").unwrap();

        assert_ne!(first, second);
        assert!(service.verify("correct-horse", &second).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error_not_a_mismatch() {
        let service = Argon2PasswordService::new();

        assert!(matches!(
            service.verify("anything", "not-a-phc-string"),
            Err(AuthError::HashingError(_))
        ));
    }
}
