//! Local metadata index mapping business fields to repository ids.

mod connection;
mod sqlite_index;
mod store;
mod types;

pub use connection::*;
pub use sqlite_index::*;
pub use store::*;
pub use types::*;
