//! Relocation of a file or directory tree (used when trashing).
//! Tries a rename first; across filesystems it copies the tree and removes the source.

use std::fs;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::errors::{Result, TransferError};

use super::copy::safe_copy_and_rename;
use super::mkdir::ensure_dir;
use super::util::is_cross_device;

/// Move `src` (file or directory) to `dst`. The parent of `dst` must exist.
pub fn relocate(src: &Path, dst: &Path) -> Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => {
            info!(src = %src.display(), dest = %dst.display(), "Renamed atomically");
            return Ok(());
        }
        Err(e) if is_cross_device(&e) => {
            warn!(error = %e, "Cross-device rename, falling back to copy+remove");
        }
        Err(e) => return Err(TransferError::io("rename", src)(e)),
    }

    if src.is_dir() {
        for entry in WalkDir::new(src).into_iter().filter_map(|e| e.ok()) {
            let rel = entry
                .path()
                .strip_prefix(src)
                .map_err(|_| TransferError::Unsupported(format!("walk escaped {}", src.display())))?;
            let target = dst.join(rel);
            if entry.file_type().is_dir() {
                ensure_dir(&target)?;
            } else if entry.file_type().is_file() {
                safe_copy_and_rename(entry.path(), &target)?;
            }
        }
        fs::remove_dir_all(src).map_err(TransferError::io("remove source directory", src))?;
    } else {
        safe_copy_and_rename(src, dst)?;
        fs::remove_file(src).map_err(TransferError::io("remove original file", src))?;
    }
    info!(src = %src.display(), dest = %dst.display(), "Copied and removed source");
    Ok(())
}
