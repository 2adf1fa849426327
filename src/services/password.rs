use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};

pub use argon2::password_hash::Error as PasswordHashError;

/// Salt and hash a password. Every call draws a fresh salt, so hashing the
/// same password twice yields different PHC strings.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let hashes: Vec<String> = (0..3)
            .map(|_| hash_password("pw1").expect("hashing should succeed"))
            .collect();

        assert_ne!(hashes[0], hashes[1]);
        assert_ne!(hashes[1], hashes[2]);
        assert_ne!(hashes[0], hashes[2]);
        for hash in &hashes {
            assert!(verify_password("pw1", hash));
        }
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(!verify_password("pw1", "not-a-phc-string"));
        assert!(!verify_password("pw1", ""));
    }
}
