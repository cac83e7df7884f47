//! Repository authentication tickets.
//!
//! Every orchestrated operation obtains a fresh [`AuthTicket`] for the
//! configured service [`Principal`]; tickets are never cached.

mod provider;
mod session;
mod types;

pub use provider::*;
pub use session::*;
pub use types::*;
