//! Workbook container assembly.
//!
//! The binary workbook format ships its record streams inside a
//! compound container. This facade owns the container conventions: the
//! document stream name, the property-set stream names, and the
//! workbook class id on the root entry.

use std::io::Write;
use std::path::Path;

use quill_ole::OleWriter;

use crate::error::XlsResult;
use crate::stream::RecordStream;

/// Name of the stream holding the workbook record data.
pub const DOCUMENT_STREAM: &str = "Workbook";
/// Name of the standard property-set stream (title, author, ...).
pub const SUMMARY_STREAM: &str = "\x05SummaryInformation";
/// Name of the extended property-set stream.
pub const DOCUMENT_SUMMARY_STREAM: &str = "\x05DocumentSummaryInformation";

/// Class id `{00020820-0000-0000-C000-000000000046}` identifying the
/// container as a workbook, serialized little-endian.
pub const WORKBOOK_CLASS_ID: [u8; 16] = [
    0x20, 0x08, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x46,
];

const ROOT_ENTRY_NAME: &str = "Root Entry";

/// Packs finalized record streams into a workbook container.
#[derive(Debug)]
pub struct XlsWriter {
    container: OleWriter,
}

impl XlsWriter {
    pub fn new() -> XlsResult<Self> {
        let mut container = OleWriter::new(ROOT_ENTRY_NAME)?;
        container.set_root_class_id(WORKBOOK_CLASS_ID);
        Ok(Self { container })
    }

    /// Drain `stream` and register it as the [`DOCUMENT_STREAM`].
    pub fn set_document_stream(&mut self, mut stream: RecordStream) -> XlsResult<()> {
        let bytes = stream.take_bytes();
        log::debug!("document stream: {} bytes", bytes.len());
        self.container.add_stream(DOCUMENT_STREAM, bytes)?;
        Ok(())
    }

    /// Register an auxiliary named stream, e.g. a property set under
    /// [`SUMMARY_STREAM`] or [`DOCUMENT_SUMMARY_STREAM`].
    pub fn add_stream(&mut self, name: &str, bytes: Vec<u8>) -> XlsResult<()> {
        self.container.add_stream(name, bytes)?;
        Ok(())
    }

    /// Assemble the container and write it to a sink.
    pub fn write_to<W: Write>(&self, sink: W) -> XlsResult<()> {
        self.container.write_to(sink)?;
        Ok(())
    }

    /// Assemble the container and write it to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> XlsResult<()> {
        self.container.save(path)?;
        Ok(())
    }
}
