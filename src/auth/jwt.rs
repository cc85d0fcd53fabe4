/// JWT Token Generation and Validation
///
/// Access tokens are HS256-signed and stateless: validation never touches the
/// database, so an access token stays valid until it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::error::AuthError;

/// Clock skew tolerated when checking `exp`, in seconds
pub const EXPIRY_LEEWAY_SECONDS: u64 = 5;

/// Issue a signed access token for `user_id` that expires after `ttl`.
///
/// # Errors
/// Returns `AuthError::Signing` if encoding fails
pub fn make_jwt(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    sign_claims(&Claims::new(user_id, Utc::now(), ttl), secret)
}

pub(crate) fn sign_claims(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Validate an access token and return the user it was issued to.
///
/// # Errors
/// Returns `AuthError::InvalidToken` if the token is malformed, was signed
/// with another secret or issuer, or expired more than
/// `EXPIRY_LEEWAY_SECONDS` ago.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = EXPIRY_LEEWAY_SECONDS;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    claims.user_id()
}
