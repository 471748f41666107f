//! # quill-ole
//!
//! OLE2 compound container writer for quill.
//!
//! This crate serializes named streams into the structured-storage
//! container that legacy office formats are shipped in: a sector-based
//! file with an allocation depot, a directory tree, and a short-stream
//! container for small streams.

pub mod depot;
pub mod entry;
pub mod error;
pub mod writer;

pub use entry::{DirEntry, EntryKind};
pub use error::{OleError, OleResult};
pub use writer::OleWriter;
