/// Authentication module
///
/// Password hashing, access token (JWT) issuance and validation, refresh
/// token lifecycle, and credential extraction from request headers.

mod claims;
mod extract;
mod extractor;
mod jwt;
mod password;
mod refresh_token;

pub use claims::{Claims, ISSUER};
pub use extract::{get_api_key, get_bearer_token};
pub use extractor::{AuthenticatedUser, WebhookCaller};
pub use jwt::{make_jwt, validate_jwt, EXPIRY_LEEWAY_SECONDS};
pub use password::{check_password_hash, hash_password, verify_login, DummyPasswordHash};
pub use refresh_token::{
    issue_refresh_token, make_refresh_token, refresh_access_token, revoke_refresh_token,
    RefreshTokenRecord, RefreshTokenState, RefreshTokenStore,
};
