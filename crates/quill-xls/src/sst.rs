//! Shared-string table sizing.
//!
//! The EXTSST record indexes the shared-string table in buckets so a
//! reader can seek into it; its layout must be sized before the table is
//! written. Only the bucket arithmetic lives here.

/// Bucket layout `(bucket_count, bucket_size)` for a shared-string table
/// with `unique_strings` entries.
///
/// Small tables keep the fixed bucket size of 8; from 1024 strings up
/// the bucket size scales so the bucket count stays bounded at 128.
pub fn bucket_layout(unique_strings: u32) -> (u32, u32) {
    let bucket_size = if unique_strings < 1024 {
        8
    } else {
        1 + unique_strings / 128
    };
    let bucket_count = (unique_strings + bucket_size - 1) / bucket_size;
    (bucket_count, bucket_size)
}
