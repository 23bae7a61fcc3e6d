//! Password hashing with Argon2id.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::errors::{CryptoError, CryptoResult};

/// Hash a password with Argon2id and a freshly generated per-user salt.
///
/// # Arguments
///
/// * `plain` - The plaintext password
///
/// # Returns
///
/// * `CryptoResult<(String, String)>` - PHC hash string and the salt string
///
/// # Errors
///
/// * `CryptoError::HashingFailed` - Argon2 rejected the input
pub fn hash_password(plain: &str) -> CryptoResult<(String, String)> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|_| CryptoError::HashingFailed)?
        .to_string();

    Ok((hash, salt.to_string()))
}

/// Verify a candidate password against a stored PHC hash string.
///
/// The salt and Argon2 parameters are carried inside the PHC string. The
/// digest comparison happens inside the `password_hash` verifier, which
/// checks the full length without short-circuiting on the first
/// differing byte.
pub fn verify_password(hash: &str, candidate: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let (hash, salt) = hash_password("CorrectHorse42!").unwrap();
        assert!(!hash.is_empty());
        assert!(!salt.is_empty());
        assert!(verify_password(&hash, "CorrectHorse42!"));
    }

    #[test]
    fn wrong_password_rejected() {
        let (hash, _) = hash_password("CorrectHorse42!").unwrap();
        assert!(!verify_password(&hash, "WrongHorse42!"));
        assert!(!verify_password(&hash, ""));
    }

    #[test]
    fn salts_are_unique_per_hash() {
        let (hash_a, salt_a) = hash_password("SamePassword1!").unwrap();
        let (hash_b, salt_b) = hash_password("SamePassword1!").unwrap();
        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn garbage_hash_string_rejected() {
        assert!(!verify_password("not-a-phc-string", "whatever"));
    }
}
