//! Mock ticket provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::ticket::{AuthTicket, Principal, TicketError, TicketProvider};

/// Mock implementation of the TicketProvider trait.
///
/// Issues `TICKET_mock_<n>` tickets, counts calls, and can fail once
/// ([`set_next_error`](Self::set_next_error)) or always
/// ([`set_failing`](Self::set_failing)).
#[derive(Debug, Default)]
pub struct MockTicketProvider {
    calls: AtomicUsize,
    next_error: Mutex<Option<TicketError>>,
    failing: AtomicBool,
    principals: Mutex<Vec<String>>,
}

impl MockTicketProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next call fails with `error`.
    pub fn set_next_error(&self, error: TicketError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Every call fails while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User ids tickets were requested for, in call order.
    pub fn recorded_principals(&self) -> Vec<String> {
        self.principals.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketProvider for MockTicketProvider {
    async fn authenticate(&self, principal: &Principal) -> Result<AuthTicket, TicketError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.principals
            .lock()
            .unwrap()
            .push(principal.user_id.clone());

        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TicketError::Unavailable("mock ticket provider failing".to_string()));
        }

        Ok(AuthTicket::new(format!("TICKET_mock_{}", n)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
