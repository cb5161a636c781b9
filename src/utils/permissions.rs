//! File permission helpers for in-place rewrites
//!
//! A rewritten file is staged in a fresh temp file, which gets the process
//! default mode. These helpers carry the original mode across the rename.

use std::fs::{self, Permissions};
use std::path::Path;

/// Read the permissions of an existing file
pub fn capture(path: &Path) -> std::io::Result<Permissions> {
    Ok(fs::metadata(path)?.permissions())
}

/// Apply previously captured permissions to `path`
pub fn restore(path: &Path, permissions: &Permissions) -> std::io::Result<()> {
    fs::set_permissions(path, permissions.clone())
}
