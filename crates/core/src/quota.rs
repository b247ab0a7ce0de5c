//! Storage quota accounting.
//!
//! The quota guard re-walks the uploads tree on every upload and compares
//! the total against the configured capacity. O(files on disk) per upload
//! is acceptable at single-node scale with bounded retention; a running
//! total maintained on upload/delete/sweep would remove the ceiling.

use std::io;
use std::path::Path;

/// Default maximum capacity of the uploads tree: 100 GiB.
pub const DEFAULT_MAX_CAPACITY_BYTES: u64 = 100 * 1024 * 1024 * 1024;

/// Whether an upload declaring `declared` bytes fits the capacity.
/// A total that overflows `u64` can never fit.
pub fn admits(used: u64, declared: u64, max_capacity: u64) -> bool {
    used.checked_add(declared)
        .is_some_and(|total| total <= max_capacity)
}

/// Recursively sum the byte size of all files under `root`.
///
/// Entries whose metadata cannot be read (racing deletes, dangling
/// symlinks) are skipped; a directory that cannot be listed is an error,
/// since it would leave the quota state unknown.
pub fn directory_used_size(root: &Path) -> io::Result<u64> {
    let mut total = 0u64;
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        let Ok(meta) = std::fs::symlink_metadata(&path) else {
            continue;
        };
        if meta.is_dir() {
            total += directory_used_size(&path)?;
        } else if meta.is_file() {
            total += meta.len();
        }
    }
    Ok(total)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
