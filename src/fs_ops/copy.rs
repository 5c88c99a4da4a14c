//! Safe copy-and-rename helper:
//! - Copies to a temp file in the destination directory
//! - Ensures data durability (io_copy::copy_streaming fsyncs the temp file)
//! - Atomically renames temp -> dest
//! - Fsyncs the destination directory (Unix; handled in atomic::try_atomic_move)

use std::fs;
use std::path::Path;

use crate::errors::{Result, TransferError};

use super::atomic::try_atomic_move;
use super::{io_copy, util};

/// Copy `src` -> temp file in dest dir, then atomic rename temp -> dest.
/// The destination directory must already exist. Returns the bytes copied.
pub fn safe_copy_and_rename(src: &Path, dest: &Path) -> Result<u64> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| TransferError::Unsupported(format!("destination has no parent: {}", dest.display())))?;

    let tmp_path = util::unique_temp_path(dest_dir);

    let bytes = match io_copy::copy_streaming(src, &tmp_path) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(TransferError::io("copy file", src)(e));
        }
    };

    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(TransferError::io("rename temporary file into place", dest)(e));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_bytes_and_leaves_no_temp() {
        let td = tempdir().unwrap();
        let src = td.path().join("Todo.md");
        fs::write(&src, "- [ ] call back").unwrap();
        let dest_dir = td.path().join("Imported");
        fs::create_dir_all(&dest_dir).unwrap();
        let dest = dest_dir.join("Todo.md");

        let n = safe_copy_and_rename(&src, &dest).unwrap();
        assert_eq!(n, 15);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "- [ ] call back");

        for entry in fs::read_dir(&dest_dir).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().into_owned();
            assert!(!name.ends_with(".tmp"), "tmp file left behind: {name}");
        }
    }

    #[test]
    fn missing_source_is_io_error_and_cleans_up() {
        let td = tempdir().unwrap();
        let dest = td.path().join("out.md");
        let err = safe_copy_and_rename(&td.path().join("missing.md"), &dest).unwrap_err();
        assert_eq!(err.kind(), "io");
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(td.path()).unwrap().count(), 0);
    }
}
