//! Remote document repository.

mod client;
mod error;
mod traits;
mod types;

pub use client::*;
pub use error::*;
pub use traits::*;
pub use types::*;
