//! Password hashing contract.
//!
//! The core only ever sees digests. Implementations live at the edge of the
//! system (see the API crate for the Argon2 one).

use crate::errors::GymResult;

pub trait PasswordHasher: Send + Sync {
    /// Produces a self-describing digest for `plaintext`.
    fn hash(&self, plaintext: &str) -> GymResult<String>;

    /// Checks `plaintext` against a digest produced by [`PasswordHasher::hash`].
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}
