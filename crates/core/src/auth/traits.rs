use thiserror::Error;

use super::types::{Caller, CallerRequest};
use crate::config::AuthMethod;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallerAuthError {
    #[error("API key required")]
    MissingCredentials,

    #[error("Invalid API key")]
    InvalidCredentials,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Gate in front of every `/api/v1` route.
pub trait CallerAuthenticator: Send + Sync {
    fn verify(&self, request: &CallerRequest) -> Result<Caller, CallerAuthError>;

    fn method(&self) -> AuthMethod;
}
