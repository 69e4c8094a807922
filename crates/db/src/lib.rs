//! Document store used by the library service.
//!
//! A [`Collection`] holds [`Record`]s of a single [`Document`] type. The store
//! assigns identifiers and timestamps and enforces the document schema on every
//! write, so callers never persist a record that fails [`Document::validate`].

pub mod collection;
pub mod document;
pub mod error;
pub mod id;
pub mod memory;

pub use collection::Collection;
pub use document::{Document, Record};
pub use error::{StoreError, StoreResult};
pub use id::{DocumentId, InvalidId};
pub use memory::MemoryCollection;
