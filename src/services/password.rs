//! Password hashing helpers (bcrypt).

use crate::error::AppError;
use bcrypt::DEFAULT_COST;

/// Hash a password with a salted one-way hash.
pub fn hash(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Check a password against a stored hash.
///
/// A malformed stored hash reads as a mismatch; the caller cannot tell
/// the two apart, which is what the login path wants.
pub fn verify(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_and_hides_plaintext() {
        let hashed = hash("hunter2").unwrap();

        assert_ne!(hashed, "hunter2");
        assert!(verify("hunter2", &hashed));
        assert!(!verify("hunter3", &hashed));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        assert!(!verify("hunter2", "not-a-bcrypt-hash"));
    }
}
