//! Idempotent directory creation.
//! Concurrent transfers may race on the same destination tree; an
//! `AlreadyExists` outcome counts as success as long as the path is a directory.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::errors::{Result, TransferError};

/// Ensure `dir` exists as a directory, creating missing ancestors.
/// Returns true when this call created it.
pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    match fs::create_dir_all(dir) {
        Ok(()) => {
            debug!(path = %dir.display(), "Created directory");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(false),
        Err(e) => Err(TransferError::io("create directory", dir)(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_nested_then_reports_existing() {
        let td = tempdir().unwrap();
        let nested = td.path().join("Imported/2023/05");
        assert!(ensure_dir(&nested).unwrap());
        assert!(nested.is_dir());
        assert!(!ensure_dir(&nested).unwrap());
    }

    #[test]
    fn file_in_the_way_is_an_error() {
        let td = tempdir().unwrap();
        let blocker = td.path().join("Imported");
        fs::write(&blocker, b"not a dir").unwrap();
        let err = ensure_dir(&blocker.join("sub")).unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
