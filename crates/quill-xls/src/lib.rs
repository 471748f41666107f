//! # quill-xls
//!
//! Legacy binary workbook (BIFF8) stream writer for quill.
//!
//! This crate frames BIFF8 records, buffers them into substreams, and
//! packs finalized streams into a compound container via `quill-ole`.

pub mod error;
pub mod records;
pub mod sst;
pub mod stream;
pub mod writer;

pub use error::{XlsError, XlsResult};
pub use stream::{encode_record, RecordStream, MAX_RECORD_PAYLOAD};
pub use writer::XlsWriter;

#[cfg(test)]
mod tests_proptest;
