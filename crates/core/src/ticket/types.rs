use std::fmt;

use crate::config::PrincipalConfig;

/// Opaque bearer credential issued by the repository.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthTicket(String);

impl AuthTicket {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthTicket(<redacted>)")
    }
}

/// Service identity tickets are issued for.
#[derive(Clone)]
pub struct Principal {
    pub user_id: String,
    pub password: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }
}

impl From<&PrincipalConfig> for Principal {
    fn from(config: &PrincipalConfig) -> Self {
        Self::new(config.user_id.clone(), config.password.clone())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}
