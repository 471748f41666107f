//! Compound container assembly.
//!
//! A container is a fixed header region followed by numbered 4096-byte
//! sectors. This writer lays the sectors out in emission order: the
//! allocation depot, the directory, the mini depot, the big-stream data,
//! and finally the short-stream container. Streams shorter than 4096
//! bytes are chained through 64-byte mini sectors inside the
//! short-stream container, which the root entry's own chain holds.
//!
//! Byte offset of sector N is `(N + 1) * 4096`.

use std::cmp::Ordering;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::depot::{Depot, END_OF_CHAIN, FREE_SECTOR};
use crate::entry::{compare_names, validate_name, DirEntry, DIR_ENTRY_LEN, NO_STREAM};
use crate::error::{OleError, OleResult};

/// Container magic bytes.
pub const MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Size of one numbered sector.
pub const SECTOR_SIZE: usize = 4096;
/// Size of one mini sector in the short-stream container.
pub const MINI_SECTOR_SIZE: usize = 64;
/// Streams below this many bytes live in the short-stream container.
pub const SHORT_STREAM_CUTOFF: usize = 4096;
/// Size of the header structure. The remainder of the header region up
/// to the first numbered sector is zero.
pub const HEADER_LEN: usize = 512;
/// Hard cap on the declared stream bytes of one container. Legacy
/// consumers of the format stop addressing past this point.
pub const MAX_CONTAINER_BYTES: u64 = 7_087_104;

/// Depot sector ids stored directly in the header.
const HEADER_DEPOT_SLOTS: usize = 109;

/// One caller-registered node under the root.
#[derive(Debug)]
enum Member {
    Storage { name: String },
    Stream { name: String, data: Vec<u8> },
}

impl Member {
    fn name(&self) -> &str {
        match self {
            Member::Storage { name } => name,
            Member::Stream { name, .. } => name,
        }
    }

    fn data_len(&self) -> u64 {
        match self {
            Member::Storage { .. } => 0,
            Member::Stream { data, .. } => data.len() as u64,
        }
    }
}

/// Assembles one compound container from named streams.
///
/// Streams and storages are collected up front; [`OleWriter::to_bytes`]
/// computes the full layout and serializes it in one pass. Building is a
/// pure function of the collected state, so it can run repeatedly and
/// leaves nothing behind between builds.
#[derive(Debug)]
pub struct OleWriter {
    root_name: String,
    root_class_id: [u8; 16],
    members: Vec<Member>,
}

impl OleWriter {
    /// Start a container whose root entry carries `root_name`.
    pub fn new(root_name: &str) -> OleResult<Self> {
        validate_name(root_name)?;
        Ok(Self {
            root_name: root_name.to_string(),
            root_class_id: [0u8; 16],
            members: Vec::new(),
        })
    }

    /// Set the class id serialized into the root entry.
    pub fn set_root_class_id(&mut self, class_id: [u8; 16]) {
        self.root_class_id = class_id;
    }

    /// Register a named stream under the root.
    pub fn add_stream(&mut self, name: &str, data: Vec<u8>) -> OleResult<()> {
        self.check_new_name(name)?;
        self.members.push(Member::Stream {
            name: name.to_string(),
            data,
        });
        Ok(())
    }

    /// Register an empty storage node under the root.
    pub fn add_storage(&mut self, name: &str) -> OleResult<()> {
        self.check_new_name(name)?;
        self.members.push(Member::Storage {
            name: name.to_string(),
        });
        Ok(())
    }

    fn check_new_name(&self, name: &str) -> OleResult<()> {
        validate_name(name)?;
        // Sibling names that compare equal (case-insensitively) cannot
        // coexist in the directory tree
        if self
            .members
            .iter()
            .any(|m| compare_names(m.name(), name) == Ordering::Equal)
        {
            return Err(OleError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Assemble the container and return its bytes.
    pub fn to_bytes(&self) -> OleResult<Vec<u8>> {
        // Oversize is a precondition on the declared stream bytes,
        // checked before anything is produced
        let declared: u64 = self.members.iter().map(Member::data_len).sum();
        if declared > MAX_CONTAINER_BYTES {
            return Err(OleError::Oversize {
                requested: declared,
                limit: MAX_CONTAINER_BYTES,
            });
        }

        // Size: classify streams and count sectors per region
        let mut big_sectors = 0u32;
        let mut mini_sectors = 0u32;
        for member in &self.members {
            if let Member::Stream { data, .. } = member {
                if data.len() >= SHORT_STREAM_CUTOFF {
                    big_sectors += blocks(data.len() as u64, SECTOR_SIZE as u64);
                } else {
                    mini_sectors += blocks(data.len() as u64, MINI_SECTOR_SIZE as u64);
                }
            }
        }
        let mini_container_bytes = u64::from(mini_sectors) * MINI_SECTOR_SIZE as u64;
        let mini_container_sectors = blocks(mini_container_bytes, SECTOR_SIZE as u64);
        let mini_depot_sectors = blocks(u64::from(mini_sectors) * 4, SECTOR_SIZE as u64);
        let dir_entries = 1 + self.members.len();
        let dir_sectors = blocks((dir_entries * DIR_ENTRY_LEN) as u64, SECTOR_SIZE as u64);

        let chained = dir_sectors + mini_depot_sectors + big_sectors + mini_container_sectors;
        let depot_sectors = size_depot(chained)?;

        log::debug!(
            "container layout: {} depot, {} directory, {} mini depot, {} big, {} short-container sectors",
            depot_sectors,
            dir_sectors,
            mini_depot_sectors,
            big_sectors,
            mini_container_sectors
        );

        // Allocate chains in physical order: depot, directory, mini
        // depot, big streams, short-stream container
        let mut depot = Depot::new();
        depot.reserve_self(depot_sectors);
        let dir_start = depot.chain(dir_sectors);
        let mini_depot_start = depot.chain(mini_depot_sectors);

        let mut mini_depot = Depot::new();
        let mut entries = Vec::with_capacity(dir_entries);
        entries.push(DirEntry::root(&self.root_name)?);
        for member in &self.members {
            entries.push(match member {
                Member::Storage { name } => DirEntry::storage(name)?,
                Member::Stream { name, data } => {
                    let size = data.len() as u64;
                    let start = if data.len() >= SHORT_STREAM_CUTOFF {
                        depot.chain(blocks(size, SECTOR_SIZE as u64))
                    } else {
                        mini_depot.chain(blocks(size, MINI_SECTOR_SIZE as u64))
                    };
                    DirEntry::stream(name, start, size)?
                }
            });
        }
        let mini_container_start = depot.chain(mini_container_sectors);
        entries[0].start = mini_container_start;
        entries[0].size = mini_container_bytes;
        entries[0].class_id = self.root_class_id;

        let total_sectors = depot.len();
        debug_assert_eq!(total_sectors, chained + depot_sectors);

        // Build the directory tree: canonical sibling order, links by
        // midpoint split
        let mut sorted: Vec<u32> = (1..entries.len() as u32).collect();
        sorted.sort_by(|&a, &b| compare_names(entries[a as usize].name(), entries[b as usize].name()));
        entries[0].child = link_siblings(&mut entries, &sorted);

        // Serialize
        let mut out = Vec::with_capacity((1 + total_sectors as usize) * SECTOR_SIZE);
        out.extend_from_slice(&encode_header(
            depot_sectors,
            dir_sectors,
            dir_start,
            mini_depot_start,
            mini_depot_sectors,
        ));
        out.resize(SECTOR_SIZE, 0);

        out.extend_from_slice(&depot.encode(SECTOR_SIZE));

        for entry in &entries {
            out.extend_from_slice(&entry.encode());
        }
        let dir_capacity = dir_sectors as usize * (SECTOR_SIZE / DIR_ENTRY_LEN);
        for _ in entries.len()..dir_capacity {
            out.extend_from_slice(&DirEntry::free_record());
        }

        out.extend_from_slice(&mini_depot.encode(SECTOR_SIZE));

        for member in &self.members {
            if let Member::Stream { data, .. } = member {
                if data.len() >= SHORT_STREAM_CUTOFF {
                    out.extend_from_slice(data);
                    pad_to(&mut out, SECTOR_SIZE);
                }
            }
        }

        for member in &self.members {
            if let Member::Stream { data, .. } = member {
                if !data.is_empty() && data.len() < SHORT_STREAM_CUTOFF {
                    out.extend_from_slice(data);
                    pad_to(&mut out, MINI_SECTOR_SIZE);
                }
            }
        }
        pad_to(&mut out, SECTOR_SIZE);

        debug_assert_eq!(out.len(), (1 + total_sectors as usize) * SECTOR_SIZE);
        Ok(out)
    }

    /// Assemble the container and write it to an arbitrary sink.
    pub fn write_to<W: Write>(&self, mut sink: W) -> OleResult<()> {
        let bytes = self.to_bytes()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    /// Assemble the container and write it to a file path.
    ///
    /// The container is built fully in memory first, so a failed build
    /// never leaves a file behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> OleResult<()> {
        let bytes = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&bytes)?;
        Ok(())
    }
}

/// Assign sibling links for `sids` (sorted canonically) by recursive
/// midpoint split and return the subtree root, so that in-order traversal
/// of the links reproduces the canonical order.
fn link_siblings(entries: &mut [DirEntry], sids: &[u32]) -> u32 {
    if sids.is_empty() {
        return NO_STREAM;
    }
    let mid = sids.len() / 2;
    let left = link_siblings(entries, &sids[..mid]);
    let right = link_siblings(entries, &sids[mid + 1..]);
    let sid = sids[mid];
    entries[sid as usize].left = left;
    entries[sid as usize].right = right;
    sid
}

/// Count the depot sectors covering `chained` sectors of payload. The
/// depot chains its own sectors too, so its size is a fixed point, not a
/// single division. The header lists at most [`HEADER_DEPOT_SLOTS`] depot
/// sectors; a layout needing more cannot be addressed and is rejected.
fn size_depot(chained: u32) -> OleResult<u32> {
    let mut depot_sectors = 0u32;
    loop {
        let need = blocks(u64::from(chained + depot_sectors) * 4, SECTOR_SIZE as u64);
        if need == depot_sectors {
            break;
        }
        depot_sectors = need;
    }
    if depot_sectors as usize > HEADER_DEPOT_SLOTS {
        return Err(OleError::DepotOverflow {
            needed: depot_sectors,
            limit: HEADER_DEPOT_SLOTS as u32,
        });
    }
    Ok(depot_sectors)
}

/// The fixed 512-byte header structure.
fn encode_header(
    depot_sectors: u32,
    dir_sectors: u32,
    dir_start: u32,
    mini_depot_start: u32,
    mini_depot_sectors: u32,
) -> [u8; HEADER_LEN] {
    let mut h = [0u8; HEADER_LEN];

    h[0..8].copy_from_slice(&MAGIC);
    // Header class id at 8..24 stays zero
    h[24..26].copy_from_slice(&0x003Eu16.to_le_bytes()); // minor version
    h[26..28].copy_from_slice(&4u16.to_le_bytes()); // major version, 4096-byte sectors
    h[28..30].copy_from_slice(&0xFFFEu16.to_le_bytes()); // little-endian marker
    h[30..32].copy_from_slice(&12u16.to_le_bytes()); // sector shift
    h[32..34].copy_from_slice(&6u16.to_le_bytes()); // mini sector shift
    // Reserved at 34..40 stays zero
    h[40..44].copy_from_slice(&dir_sectors.to_le_bytes());
    h[44..48].copy_from_slice(&depot_sectors.to_le_bytes());
    h[48..52].copy_from_slice(&dir_start.to_le_bytes());
    // Transaction signature at 52..56 stays zero
    h[56..60].copy_from_slice(&(SHORT_STREAM_CUTOFF as u32).to_le_bytes());
    h[60..64].copy_from_slice(&mini_depot_start.to_le_bytes());
    h[64..68].copy_from_slice(&mini_depot_sectors.to_le_bytes());
    h[68..72].copy_from_slice(&END_OF_CHAIN.to_le_bytes()); // no depot overflow list
    // Overflow list length at 72..76 stays zero

    // Depot sector ids live directly in the header; the depot sits at
    // the front of the file, so they are 0..depot_sectors
    for slot in 0..HEADER_DEPOT_SLOTS {
        let value = if (slot as u32) < depot_sectors {
            slot as u32
        } else {
            FREE_SECTOR
        };
        h[76 + slot * 4..80 + slot * 4].copy_from_slice(&value.to_le_bytes());
    }

    h
}

#[inline]
fn blocks(bytes: u64, unit: u64) -> u32 {
    ((bytes + unit - 1) / unit) as u32
}

fn pad_to(out: &mut Vec<u8>, unit: usize) {
    let rem = out.len() % unit;
    if rem != 0 {
        out.resize(out.len() + unit - rem, 0);
    }
}
