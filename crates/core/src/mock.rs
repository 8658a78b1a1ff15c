//! Mocks of the core collaborators, for tests in this and downstream crates.

use async_trait::async_trait;
use mockall::mock;

use crate::errors::GymResult;
use crate::store::{Database, Transaction};

mock! {
    pub Hasher {}

    impl crate::auth::PasswordHasher for Hasher {
        fn hash(&self, plaintext: &str) -> GymResult<String>;
        fn verify(&self, plaintext: &str, digest: &str) -> bool;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl Database for Store {
        async fn begin(&self) -> GymResult<Box<dyn Transaction>>;
        async fn ping(&self) -> GymResult<()>;
    }
}

impl MockHasher {
    /// A hasher that prefixes the plaintext and verifies by comparing.
    pub fn plain() -> Self {
        let mut hasher = MockHasher::new();
        hasher
            .expect_hash()
            .returning(|plaintext| Ok(format!("hashed:{plaintext}")));
        hasher
            .expect_verify()
            .returning(|plaintext, digest| digest == format!("hashed:{plaintext}"));
        hasher
    }
}
