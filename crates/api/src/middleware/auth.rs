//! # Password Hashing
//!
//! Argon2 implementation of the core [`PasswordHasher`] contract. Digests are
//! stored in PHC string format, so parameters and salt travel with the hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher as _, PasswordVerifier,
};
use eyre::eyre;
use gym_core::auth::PasswordHasher;
use gym_core::errors::{GymError, GymResult};

/// Argon2id with the crate's default parameters and a fresh random salt per
/// password.
#[derive(Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> GymResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| GymError::Internal(eyre!("Error hashing password: {e}")))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        // A digest that does not parse can never match.
        PasswordHash::new(digest)
            .map(|parsed| {
                self.argon2
                    .verify_password(plaintext.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}
