use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum PasswordError {
    #[error("password does not match")]
    Mismatch,

    #[error("password hashing failed: {0}")]
    Hashing(PasswordHashError),

    #[error("invalid argon2 params: {0}")]
    Params(argon2::Error),
}

/// Argon2id с фиксированными параметрами (19 MiB, 2 прохода, 1 поток).
pub(crate) struct PasswordService {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl PasswordService {
    const MEMORY_KIB: u32 = 19 * 1024;
    const ITERATIONS: u32 = 2;
    const PARALLELISM: u32 = 1;

    pub(crate) fn new() -> Result<Self, PasswordError> {
        let params = Params::new(Self::MEMORY_KIB, Self::ITERATIONS, Self::PARALLELISM, None)
            .map_err(PasswordError::Params)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"blogicum-dummy-password", &salt)
            .map_err(PasswordError::Hashing)?
            .to_string();

        Ok(Self { argon2, dummy_hash })
    }

    pub(crate) fn hash(&self, raw_password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(raw_password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(PasswordError::Hashing)
    }

    pub(crate) fn verify(&self, raw_password: &str, stored_hash: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::Hashing)?;
        self.argon2
            .verify_password(raw_password.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => PasswordError::Mismatch,
                other => PasswordError::Hashing(other),
            })
    }

    /// Тратит на неизвестного пользователя столько же времени, сколько на проверку пароля.
    pub(crate) fn burn_verification(&self, raw_password: &str) {
        let _ = self.verify(raw_password, &self.dummy_hash);
    }
}
