use async_trait::async_trait;
use thiserror::Error;

use super::{AuthTicket, Principal};

/// Ticket issuance failure. Fatal to the current request and never retried.
#[derive(Debug, Clone, Error)]
pub enum TicketError {
    #[error("Authentication rejected: {0}")]
    Rejected(String),

    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),

    #[error("Authentication request timed out")]
    Timeout,

    #[error("Invalid authentication response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Issues repository tickets.
#[async_trait]
pub trait TicketProvider: Send + Sync {
    /// Obtain a fresh ticket for `principal`. Exactly one attempt.
    async fn authenticate(&self, principal: &Principal) -> Result<AuthTicket, TicketError>;

    /// Name of this provider, for logs
    fn name(&self) -> &'static str;
}
