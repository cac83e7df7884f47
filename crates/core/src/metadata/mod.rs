//! Document metadata model.
//!
//! [`DocumentMetadata`] is the flat property record sent to the repository
//! alongside every document. Known fields are typed and serialized with the
//! repository's native property names; anything else rides along in
//! [`DocumentMetadata::extra`].

mod error;
mod types;

pub use error::*;
pub use types::*;
