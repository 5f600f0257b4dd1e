/// Password hashing and verification using Argon2id
///
/// Follows OWASP parameter recommendations:
/// - Algorithm: Argon2id (memory-hard, resistant to GPU attacks)
/// - Memory: 64 MB
/// - Iterations: 3
/// - Parallelism: 4 threads
/// - Salt: 16 bytes random
/// - Output: 32 bytes hash
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2, Params,
};
use thiserror::Error;

/// Password hashing and verification errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hashing(String),

    #[error("failed to verify password: {0}")]
    Verification(String),

    #[error("invalid password hash format")]
    InvalidHashFormat,

    #[error("password does not match")]
    Mismatch,
}

/// Argon2id parameters
///
/// Tuned for security while maintaining acceptable performance. Increasing
/// memory or iterations improves security but slows down hashing.
#[derive(Debug, Clone)]
pub struct HasherParams {
    /// Memory cost in KB (default: 65536 = 64 MB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 3)
    pub time_cost: u32,
    /// Parallelism (threads, default: 4)
    pub parallelism: u32,
    /// Output length in bytes (default: 32)
    pub output_len: Option<usize>,
}

impl Default for HasherParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
            output_len: Some(32),
        }
    }
}

impl HasherParams {
    /// Light parameters for test runs
    #[cfg(any(test, feature = "test-utils"))]
    pub fn fast() -> Self {
        Self {
            memory_cost: 4096, // 4 MB
            time_cost: 1,
            parallelism: 1,
            output_len: Some(32),
        }
    }

    fn to_params(&self) -> Result<Params, PasswordError> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            self.output_len,
        )
        .map_err(|e| PasswordError::Hashing(e.to_string()))
    }
}

/// Salted one-way credential transform with constant-effort comparison.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: HasherParams,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HasherParams::default())
    }
}

impl PasswordHasher {
    pub fn new(params: HasherParams) -> Self {
        Self { params }
    }

    /// Hash a plaintext password using Argon2id.
    ///
    /// The returned PHC string includes the algorithm, parameters, and a
    /// fresh random salt, so no separate salt storage is needed.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let params = self.params.to_params()?;
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        Ok(password_hash.to_string())
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Fails with `PasswordError::Mismatch` when the plaintext does not
    /// produce the stored hash; an unparseable stored hash is an
    /// `InvalidHashFormat` fault, not a credential error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

        // verification parameters come from the PHC string itself
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(()),
            Err(argon2::password_hash::Error::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::Verification(e.to_string())),
        }
    }
}
