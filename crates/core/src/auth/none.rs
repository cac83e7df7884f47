use super::{Caller, CallerAuthError, CallerAuthenticator, CallerRequest};
use crate::config::AuthMethod;

/// Lets every caller through as anonymous. Only used when configured
/// with `method = "none"`.
#[derive(Debug, Default)]
pub struct OpenAccess;

impl CallerAuthenticator for OpenAccess {
    fn verify(&self, _request: &CallerRequest) -> Result<Caller, CallerAuthError> {
        Ok(Caller::anonymous())
    }

    fn method(&self) -> AuthMethod {
        AuthMethod::None
    }
}
