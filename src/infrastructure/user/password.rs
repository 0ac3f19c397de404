//! Password hashing for stored user records

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::fmt::Debug;

use crate::domain::DomainError;

/// One-way transformation applied to a password before it reaches storage
///
/// `UserService` only calls `hash` on passwords that passed validation, so
/// implementations never see a blank or over-long value from the service.
pub trait PasswordHasher: Send + Sync + Debug {
    /// Produce the value stored as `password_hash`
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Whether `password` matches a stored `password_hash`
    fn verify(&self, password: &str, password_hash: &str) -> bool;
}

/// Argon2id hasher producing PHC strings (`$argon2id$v=19$...`)
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        if password.is_empty() {
            return Err(DomainError::internal("Refusing to hash an empty password"));
        }

        let salt = SaltString::generate(&mut OsRng);

        argon2::PasswordHasher::hash_password(&self.argon2, password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, password_hash: &str) -> bool {
        // Rows restored without a hash (e.g. deserialized users) never match
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
