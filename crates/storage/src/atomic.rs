//! Atomic file replacement
//!
//! Readers of a file written through [`write_atomic`] observe either the old
//! contents or the new contents, never a partial write: the bytes go to a
//! uniquely named temp file in the target's directory that is fsynced and
//! then renamed over the target. Concurrent writers of one target each stage
//! their own file; the last rename wins.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `bytes` to `path` atomically (temp + fsync + rename)
///
/// Creates the parent directory if needed. On failure the staging file is
/// removed and the previous contents of `path` are left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir
        }
        None => Path::new("."),
    };

    // Staging names start with ".tmp" and carry no ".json" extension, so
    // record listings never pick them up.
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}
