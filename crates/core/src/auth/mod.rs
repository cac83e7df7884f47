//! Caller authentication for the HTTP API.
//!
//! Distinct from [`crate::ticket`], which authenticates this service
//! against the repository.

mod api_key;
mod none;
mod traits;
mod types;

pub use api_key::*;
pub use none::*;
pub use traits::*;
pub use types::*;

use std::sync::Arc;

use crate::config::{AuthConfig, AuthMethod};

/// Build the caller authenticator selected by `[auth]`.
pub fn create_authenticator(
    config: &AuthConfig,
) -> Result<Arc<dyn CallerAuthenticator>, CallerAuthError> {
    match config.method {
        AuthMethod::None => Ok(Arc::new(OpenAccess)),
        AuthMethod::ApiKey => {
            let api_key = config
                .api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    CallerAuthError::Configuration(
                        "auth.api_key must be set when method = \"api_key\"".to_string(),
                    )
                })?;
            Ok(Arc::new(ApiKeyAuthenticator::new(
                api_key,
                config.header.clone(),
            )))
        }
    }
}
