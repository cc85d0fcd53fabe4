/// Password Hashing and Verification
///
/// bcrypt with a caller-supplied work factor. Production runs with the
/// configured cost (12 by default); tests use the minimum cost of 4.

use crate::auth::refresh_token::make_refresh_token;
use crate::error::AuthError;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `AuthError::Hashing` if the cost is out of range or the
/// underlying RNG fails.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored bcrypt hash
///
/// bcrypt compares the recomputed digest in constant time. A malformed hash
/// (wrong prefix, bad cost, truncated) is reported as a mismatch rather than
/// as an internal error.
pub fn check_password_hash(password: &str, hash: &str) -> Result<(), AuthError> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::PasswordMismatch),
        Err(e) => {
            tracing::debug!("Password hash could not be verified: {}", e);
            Err(AuthError::PasswordMismatch)
        }
    }
}

/// bcrypt hash of a random password nobody knows.
///
/// Logins for unknown emails are verified against it, so they pay the same
/// bcrypt cost as a wrong password for a known email.
#[derive(Clone)]
pub struct DummyPasswordHash(String);

impl DummyPasswordHash {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        Ok(Self(hash_password(&make_refresh_token(), cost)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Verify a login attempt.
///
/// `stored_hash` is `None` when no user has the submitted email. Every
/// failure, including that one, is `InvalidCredentials`, and every call runs
/// exactly one bcrypt verification.
pub fn verify_login(
    password: &str,
    stored_hash: Option<&str>,
    dummy: &DummyPasswordHash,
) -> Result<(), AuthError> {
    verify_login_with(password, stored_hash, dummy, check_password_hash)
}

fn verify_login_with<F>(
    password: &str,
    stored_hash: Option<&str>,
    dummy: &DummyPasswordHash,
    verify: F,
) -> Result<(), AuthError>
where
    F: Fn(&str, &str) -> Result<(), AuthError>,
{
    match stored_hash {
        Some(hash) => verify(password, hash).map_err(|_| AuthError::InvalidCredentials),
        None => {
            let _ = verify(password, dummy.as_str());
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::MIN_BCRYPT_COST;

    #[test]
    fn test_hash_password() {
        let password = "correctPassword123!";
        let hash = hash_password(password, MIN_BCRYPT_COST).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("hunter2", MIN_BCRYPT_COST).unwrap();
        let second = hash_password("hunter2", MIN_BCRYPT_COST).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_check_password_hash() {
        let password1 = "correctPassword123!";
        let password2 = "anotherPassword456!";
        let hash1 = hash_password(password1, MIN_BCRYPT_COST).unwrap();
        let hash2 = hash_password(password2, MIN_BCRYPT_COST).unwrap();

        let cases = vec![
            ("correct password", password1, hash1.as_str(), true),
            ("incorrect password", "wrongPassword", hash1.as_str(), false),
            ("password against a different hash", password1, hash2.as_str(), false),
            ("empty password", "", hash1.as_str(), false),
            ("invalid hash", password1, "invalidhash", false),
        ];

        for (name, password, hash, should_match) in cases {
            assert_eq!(
                check_password_hash(password, hash).is_ok(),
                should_match,
                "case: {}",
                name
            );
        }
    }

    #[test]
    fn test_mismatch_error_kind() {
        let hash = hash_password("hunter2", MIN_BCRYPT_COST).unwrap();
        assert_eq!(check_password_hash("wrong", &hash), Err(AuthError::PasswordMismatch));
    }

    #[test]
    fn test_invalid_cost() {
        let result = hash_password("hunter2", 2);
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }

    #[test]
    fn test_unknown_user_is_verified_against_dummy_hash() {
        let dummy = DummyPasswordHash::new(MIN_BCRYPT_COST).unwrap();
        let verified = std::cell::RefCell::new(Vec::new());

        let result = verify_login_with("hunter2", None, &dummy, |_, hash| {
            verified.borrow_mut().push(hash.to_string());
            Err(AuthError::PasswordMismatch)
        });

        assert_eq!(result, Err(AuthError::InvalidCredentials));
        assert_eq!(*verified.borrow(), vec![dummy.as_str().to_string()]);
    }

    #[test]
    fn test_unknown_user_fails_even_if_dummy_password_matches() {
        let dummy = DummyPasswordHash::new(MIN_BCRYPT_COST).unwrap();

        let result = verify_login_with("anything", None, &dummy, |_, _| Ok(()));

        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn test_verify_login() {
        let dummy = DummyPasswordHash::new(MIN_BCRYPT_COST).unwrap();
        let hash = hash_password("hunter2", MIN_BCRYPT_COST).unwrap();

        assert!(verify_login("hunter2", Some(&hash), &dummy).is_ok());
        assert_eq!(
            verify_login("wrong", Some(&hash), &dummy),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            verify_login("hunter2", None, &dummy),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_dummy_hash_uses_configured_cost() {
        let dummy = DummyPasswordHash::new(5).unwrap();
        assert!(dummy.as_str().starts_with("$2b$05$"));
    }
}
