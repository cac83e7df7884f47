//! Shared-secret caller authentication.

use super::{Caller, CallerAuthError, CallerAuthenticator, CallerRequest};
use crate::config::AuthMethod;

/// Accepts callers presenting the configured key, either in the configured
/// header (`x-api-key` by default) or as `Authorization: Bearer <key>`.
pub struct ApiKeyAuthenticator {
    expected: String,
    header: String,
}

impl ApiKeyAuthenticator {
    pub fn new(api_key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            expected: api_key.into(),
            header: header.into().to_ascii_lowercase(),
        }
    }

    fn presented_key<'a>(&self, request: &'a CallerRequest) -> Option<&'a str> {
        if let Some(key) = request.header(&self.header) {
            return Some(key.trim());
        }
        let authorization = request.header("authorization")?;
        let (scheme, key) = authorization.split_once(' ')?;
        scheme
            .eq_ignore_ascii_case("bearer")
            .then(|| key.trim())
    }
}

impl CallerAuthenticator for ApiKeyAuthenticator {
    fn verify(&self, request: &CallerRequest) -> Result<Caller, CallerAuthError> {
        let key = self
            .presented_key(request)
            .filter(|k| !k.is_empty())
            .ok_or(CallerAuthError::MissingCredentials)?;

        if keys_match(key.as_bytes(), self.expected.as_bytes()) {
            Ok(Caller {
                id: "api_key".to_string(),
                method: AuthMethod::ApiKey,
            })
        } else {
            Err(CallerAuthError::InvalidCredentials)
        }
    }

    fn method(&self) -> AuthMethod {
        AuthMethod::ApiKey
    }
}

// Constant time over the common length.
fn keys_match(presented: &[u8], expected: &[u8]) -> bool {
    presented.len() == expected.len()
        && presented
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
