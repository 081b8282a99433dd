//! Password utilities

use argon2::Argon2;
use argon2::password_hash::Error;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;

/// Hash a given password
///
/// Every call uses a fresh salt, hashing the same password twice gives two different hashes
pub fn hash(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let hashed_password = argon2.hash_password(password.as_bytes(), &salt)?;

    Ok(hashed_password.to_string())
}

/// Verify a given password against a given hash
///
/// A hash that can not be parsed never matches
pub fn verify(hashed_password: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hashed_password) else {
        tracing::warn!("Stored password hash could not be parsed");
        return false;
    };

    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted() {
        let first = hash("verysecret").unwrap();
        let second = hash("verysecret").unwrap();

        assert_ne!(first, second);
        assert_ne!("verysecret", first);
    }

    #[test]
    fn test_verify() {
        let hashed_password = hash("verysecret").unwrap();

        assert!(verify(&hashed_password, "verysecret"));
        assert!(!verify(&hashed_password, "notsosecret"));
        assert!(!verify(&hashed_password, ""));
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(!verify("not-a-hash", "verysecret"));
    }
}
