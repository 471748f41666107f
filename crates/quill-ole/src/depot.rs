//! Sector allocation depot.
//!
//! The depot is the container's allocation table: one u32 entry per
//! sector holding the index of the next sector in the same chain, or a
//! terminal marker. The depot's own sectors are marked self-referencing
//! inside the table rather than chained. The identical structure tracks
//! 64-byte mini sectors for the short-stream container, so one type
//! serves both tables.

/// Chain terminator: the owning stream ends at this sector.
pub const END_OF_CHAIN: u32 = 0xFFFF_FFFE;
/// Unallocated sector.
pub const FREE_SECTOR: u32 = 0xFFFF_FFFF;
/// Sector holding depot content itself.
pub const DEPOT_SECTOR: u32 = 0xFFFF_FFFD;

/// Sector allocator and chain table for one container build.
///
/// Sectors are handed out sequentially, so allocation order is physical
/// order in the emitted container.
#[derive(Debug, Default)]
pub struct Depot {
    next: Vec<u32>,
}

impl Depot {
    pub fn new() -> Self {
        Self { next: Vec::new() }
    }

    /// Sectors allocated so far.
    pub fn len(&self) -> u32 {
        self.next.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Allocate `count` consecutive sectors as one chain and return the
    /// first sector index, or `END_OF_CHAIN` when `count` is zero.
    pub fn chain(&mut self, count: u32) -> u32 {
        if count == 0 {
            return END_OF_CHAIN;
        }
        let start = self.len();
        for i in 1..count {
            self.next.push(start + i);
        }
        self.next.push(END_OF_CHAIN);
        start
    }

    /// Allocate `count` sectors for the depot's own content, marked
    /// self-referencing. Returns the first sector index.
    pub fn reserve_self(&mut self, count: u32) -> u32 {
        let start = self.len();
        for _ in 0..count {
            self.next.push(DEPOT_SECTOR);
        }
        start
    }

    /// Entry for one sector.
    pub fn entry(&self, sector: u32) -> u32 {
        self.next
            .get(sector as usize)
            .copied()
            .unwrap_or(FREE_SECTOR)
    }

    /// Serialize the table into whole sectors of little-endian entries,
    /// padding the final sector with free markers.
    pub fn encode(&self, sector_size: usize) -> Vec<u8> {
        let per_sector = sector_size / 4;
        let sectors = (self.next.len() + per_sector - 1) / per_sector;
        let mut out = Vec::with_capacity(sectors * sector_size);
        for &entry in &self.next {
            out.extend_from_slice(&entry.to_le_bytes());
        }
        while out.len() < sectors * sector_size {
            out.extend_from_slice(&FREE_SECTOR.to_le_bytes());
        }
        out
    }
}
