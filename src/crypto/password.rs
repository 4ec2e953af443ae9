use argon2::{
    Argon2, ParamsBuilder,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::LazyLock;
use zeroize::Zeroize;

use crate::crypto::token::generate_token;
use crate::error::{AppError, Result};

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 2;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the PHC-encoded hash.
pub fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    Ok(password_hash)
}

/// Verifies a password against a stored hash.
///
/// The algorithm and cost are read from the PHC string, and the final
/// comparison is constant-time. A hash that cannot be parsed never verifies.
///
/// # Arguments
///
/// * `password` - The submitted password.
/// * `hash` - The stored PHC hash.
///
/// # Returns
///
/// `true` if the password matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("⚠️ Stored password hash is not a valid PHC string: {}", e);
            return false;
        }
    };

    let mut password_bytes = password.as_bytes().to_vec();
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    result
}

/// A hash with the same costs as real ones, matching no known password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password(&generate_token()).ok());

/// Verifies `password` against a throwaway hash and discards the result.
///
/// Used when there is no stored hash to check, so the caller spends the
/// same time as for a wrong password.
pub fn verify_dummy(password: &str) {
    match DUMMY_HASH.as_deref() {
        Some(hash) => {
            verify_password(password, hash);
        }
        None => tracing::warn!("⚠️ Dummy password hash unavailable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn salts_differ_per_hash() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn dummy_hash_is_a_real_argon2id_hash() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(!verify_password("", hash));
        verify_dummy("admin123");
    }

    #[test]
    fn unparsable_hash_never_verifies() {
        assert!(!verify_password("admin123", "admin123"));
        assert!(!verify_password("x", ""));
    }
}
