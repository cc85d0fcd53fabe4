/// Credential extraction from the `Authorization` header.
///
/// Only the scheme prefix is checked here. Whatever follows it is returned
/// verbatim and validated by the caller.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// Returns the token of an `Authorization: Bearer <token>` header.
pub fn get_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    strip_scheme(headers, BEARER_PREFIX)
}

/// Returns the key of an `Authorization: ApiKey <key>` header.
pub fn get_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    strip_scheme(headers, API_KEY_PREFIX)
}

fn strip_scheme(headers: &HeaderMap, prefix: &str) -> Result<String, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedAuthHeader)?;

    value
        .strip_prefix(prefix)
        .map(str::to_string)
        .ok_or(AuthError::MalformedAuthHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(get_bearer_token(&headers_with("Bearer abc123")).unwrap(), "abc123");
    }

    #[test]
    fn test_bearer_token_empty_remainder() {
        assert_eq!(get_bearer_token(&headers_with("Bearer ")).unwrap(), "");
    }

    #[test]
    fn test_bearer_token_missing_header() {
        assert_eq!(get_bearer_token(&HeaderMap::new()), Err(AuthError::MissingAuthHeader));
    }

    #[test]
    fn test_bearer_token_malformed() {
        let malformed = ["abc123", "Bearer", "bearer abc123", "BearerToken", "Basic dXNlcjpwYXNz", ""];

        for value in malformed {
            assert_eq!(
                get_bearer_token(&headers_with(value)),
                Err(AuthError::MalformedAuthHeader),
                "header: {:?}",
                value
            );
        }
    }

    #[test]
    fn test_bearer_token_is_returned_verbatim() {
        assert_eq!(get_bearer_token(&headers_with("Bearer  two spaces")).unwrap(), " two spaces");
    }

    #[test]
    fn test_api_key() {
        assert_eq!(get_api_key(&headers_with("ApiKey secretkey")).unwrap(), "secretkey");
    }

    #[test]
    fn test_api_key_wrong_scheme() {
        assert_eq!(
            get_api_key(&headers_with("Bearer secretkey")),
            Err(AuthError::MalformedAuthHeader)
        );
        assert_eq!(get_api_key(&HeaderMap::new()), Err(AuthError::MissingAuthHeader));
    }
}
