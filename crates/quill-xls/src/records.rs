//! BIFF8 record type constants.
//!
//! Reference: [MS-XLS] §2.3 — Record Enumeration

// ── Stream structure ────────────────────────────────────────────────────
pub const BOF: u16 = 0x0809;
pub const EOF: u16 = 0x000A;
pub const CONTINUE: u16 = 0x003C;

// ── BOF subtypes (the `dt` field) ───────────────────────────────────────
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
pub const BOF_WORKSHEET: u16 = 0x0010;
pub const BOF_CHART: u16 = 0x0020;
pub const BOF_MACRO: u16 = 0x0040;

/// BIFF version we emit.
pub const BIFF8_VERSION: u16 = 0x0600;

// ── BOF payload constants ───────────────────────────────────────────────
pub const BOF_BUILD_ID: u16 = 0x0DBB; // rupBuild
pub const BOF_BUILD_YEAR: u16 = 0x07CC; // rupYear
pub const BOF_FILE_HISTORY: u32 = 0x0000_0041; // vers flags
pub const BOF_LOWEST_VERSION: u32 = 0x0000_0006; // verLowestBiff
