//! Directory entries (PPS records).
//!
//! Every node in a compound container's directory tree is one fixed
//! 128-byte record:
//!
//! - name, UTF-16LE, zero-padded to 64 bytes
//! - name length in bytes including the terminator (2 bytes)
//! - type tag (1 byte): root = 5, storage = 1, stream = 2
//! - node color (1 byte)
//! - left sibling, right sibling, child SIDs (3 x 4 bytes)
//! - class id (16 bytes)
//! - state bits and timestamps (20 bytes, written as explicit zeros)
//! - start sector (4 bytes) + stream size (8 bytes)
//!
//! Siblings under one parent are ordered shorter-name-first (UTF-16 unit
//! count), ties broken by case-insensitive comparison.

use std::cmp::Ordering;

use crate::error::{OleError, OleResult};

/// On-disk size of one directory record.
pub const DIR_ENTRY_LEN: usize = 128;

/// Longest allowed entry name. The 64-byte name field holds 32 UTF-16
/// units including the terminator.
pub const MAX_NAME_UNITS: usize = 31;

/// SID value marking an absent sibling/child link.
pub const NO_STREAM: u32 = 0xFFFF_FFFF;

const COLOR_BLACK: u8 = 1;

/// Characters the container format forbids in entry names.
const FORBIDDEN_CHARS: [char; 4] = ['/', '\\', ':', '!'];

/// Directory entry type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// The container's single root entry; its chain holds the
    /// short-stream container.
    Root,
    /// A named node with children and no bytes of its own.
    Storage,
    /// A named byte stream.
    Stream,
}

impl EntryKind {
    fn tag(self) -> u8 {
        match self {
            EntryKind::Root => 5,
            EntryKind::Storage => 1,
            EntryKind::Stream => 2,
        }
    }
}

/// One directory record.
///
/// Built by the container writer during layout; immutable once the
/// serialize step begins.
#[derive(Debug, Clone)]
pub struct DirEntry {
    name: String,
    kind: EntryKind,
    /// First sector of the entry's chain. For short streams this is a
    /// mini-sector index into the short-stream container, i.e. byte
    /// offset `start * 64` within it.
    pub(crate) start: u32,
    pub(crate) size: u64,
    pub(crate) left: u32,
    pub(crate) right: u32,
    pub(crate) child: u32,
    pub(crate) class_id: [u8; 16],
}

impl DirEntry {
    /// Create the root entry. Its chain location and size are assigned
    /// when the short-stream container has been laid out.
    pub fn root(name: &str) -> OleResult<Self> {
        Self::new(name, EntryKind::Root)
    }

    /// Create a storage entry (no stream bytes).
    pub fn storage(name: &str) -> OleResult<Self> {
        let mut entry = Self::new(name, EntryKind::Storage)?;
        // Storage entries own no chain; the start field must hold a
        // literal zero, not a chain terminator
        entry.start = 0;
        Ok(entry)
    }

    /// Create a stream entry pointing at its first sector (or mini
    /// sector, for short streams).
    pub fn stream(name: &str, start: u32, size: u64) -> OleResult<Self> {
        let mut entry = Self::new(name, EntryKind::Stream)?;
        entry.start = start;
        entry.size = size;
        Ok(entry)
    }

    fn new(name: &str, kind: EntryKind) -> OleResult<Self> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            kind,
            start: crate::depot::END_OF_CHAIN,
            size: 0,
            left: NO_STREAM,
            right: NO_STREAM,
            child: NO_STREAM,
            class_id: [0u8; 16],
        })
    }

    /// Entry name as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry type tag.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Stream size in bytes (for the root entry, the short-stream
    /// container size).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// First sector of the entry's chain.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Serialize into the fixed 128-byte record layout.
    pub fn encode(&self) -> [u8; DIR_ENTRY_LEN] {
        let mut rec = [0u8; DIR_ENTRY_LEN];

        let units: Vec<u16> = self.name.encode_utf16().collect();
        for (i, unit) in units.iter().enumerate() {
            rec[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        // Name length counts bytes, terminator included
        rec[64..66].copy_from_slice(&(((units.len() + 1) * 2) as u16).to_le_bytes());

        rec[66] = self.kind.tag();
        rec[67] = COLOR_BLACK;

        rec[68..72].copy_from_slice(&self.left.to_le_bytes());
        rec[72..76].copy_from_slice(&self.right.to_le_bytes());
        rec[76..80].copy_from_slice(&self.child.to_le_bytes());

        rec[80..96].copy_from_slice(&self.class_id);

        // State bits at 96 and both timestamps at 100 stay zero

        rec[116..120].copy_from_slice(&self.start.to_le_bytes());
        rec[120..128].copy_from_slice(&self.size.to_le_bytes());

        rec
    }

    /// Record used to pad the directory out to a sector boundary: type
    /// tag 0 (unallocated), links absent, everything else zero.
    pub(crate) fn free_record() -> [u8; DIR_ENTRY_LEN] {
        let mut rec = [0u8; DIR_ENTRY_LEN];
        rec[68..72].copy_from_slice(&NO_STREAM.to_le_bytes());
        rec[72..76].copy_from_slice(&NO_STREAM.to_le_bytes());
        rec[76..80].copy_from_slice(&NO_STREAM.to_le_bytes());
        rec
    }
}

/// Check a prospective entry name against the format's rules.
pub fn validate_name(name: &str) -> OleResult<()> {
    if name.is_empty() {
        return Err(OleError::InvalidName("name is empty".to_string()));
    }
    if name.encode_utf16().count() > MAX_NAME_UNITS {
        return Err(OleError::InvalidName(format!(
            "{:?} is longer than {} UTF-16 units",
            name, MAX_NAME_UNITS
        )));
    }
    if let Some(bad) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(OleError::InvalidName(format!(
            "{:?} contains forbidden character {:?}",
            name, bad
        )));
    }
    Ok(())
}

/// Canonical sibling order: shorter names first by UTF-16 unit count,
/// ties broken by uppercased comparison.
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    let a_units = a.encode_utf16().count();
    let b_units = b.encode_utf16().count();
    match a_units.cmp(&b_units) {
        Ordering::Equal => a.to_uppercase().cmp(&b.to_uppercase()),
        other => other,
    }
}
