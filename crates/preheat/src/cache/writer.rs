//! # Locked Cache Writer
//!
//! Writes rendered pages to disk under an advisory exclusive lock, so
//! concurrent warmers and live requests never interleave partial
//! content into the same file.

use std::fs::{DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use fs2::FileExt;
use tracing::trace;

use crate::config::CachePermissions;

/// Writer that truncates only after the exclusive lock is held.
///
/// Contention is not an error: when another writer holds the lock this
/// writer walks away and reports `Ok(false)`, leaving the file exactly
/// as the lock holder wrote it.
#[derive(Debug, Clone, Copy)]
pub struct CacheWriter {
    permissions: CachePermissions,
}

impl CacheWriter {
    pub const fn new(permissions: CachePermissions) -> Self {
        Self { permissions }
    }

    /// Writes `content` to `path`, creating parent directories as needed.
    ///
    /// Returns `Ok(true)` once the content is fully written, `Ok(false)`
    /// when another process holds the lock, and `Err` for real I/O
    /// failures. A non-zero `lock_hold` keeps the lock after the write,
    /// debouncing rapid rewrites of hot pages.
    pub fn write(&self, path: &Path, content: &[u8], lock_hold: Duration) -> io::Result<bool> {
        if let Some(parent) = path.parent() {
            let mut builder = DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(self.permissions.dir);
            }
            builder.create(parent)?;
        }

        // Open without truncating. The file must keep its old content
        // until the lock is ours.
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                trace!(path = %path.display(), "cache file locked by another writer");
                return Ok(false);
            }
            Err(error) => return Err(error),
        }

        file.set_len(0)?;
        file.write_all(content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(self.permissions.file))?;
        }

        if !lock_hold.is_zero() {
            thread::sleep(lock_hold);
        }

        // Lock releases when the handle drops.
        Ok(true)
    }
}
