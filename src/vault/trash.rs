//! Trashing notes and folders.
//!
//! The vault trash is `<vault>/.trash`. The system trash follows the
//! freedesktop layout (`files/` + `info/*.trashinfo`) except on macOS, where
//! `~/.Trash` is a flat directory.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{Result, TransferError};
use crate::fs_ops::{ensure_dir, relocate};
use crate::platform::system_trash_dir;

pub(super) const VAULT_TRASH_DIR: &str = ".trash";

/// `name`, or `name 1`, `name 2`, ... before the extension, until `taken` says no.
fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };
    let mut n = 1u32;
    loop {
        let candidate = format!("{stem} {n}{ext}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn entry_name(src: &Path) -> Result<String> {
    src.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TransferError::Unsupported(format!("cannot trash {}", src.display())))
}

/// Move `src` under `<vault_root>/.trash`, renaming on collision.
pub(super) fn to_vault_trash(vault_root: &Path, src: &Path) -> Result<PathBuf> {
    let trash = vault_root.join(VAULT_TRASH_DIR);
    ensure_dir(&trash)?;
    let name = unique_name(&entry_name(src)?, |n| trash.join(n).exists());
    let dest = trash.join(name);
    relocate(src, &dest)?;
    info!(src = %src.display(), dest = %dest.display(), "Moved to vault trash");
    Ok(dest)
}

/// Move `src` to the user's system trash.
pub(super) fn to_system_trash(src: &Path) -> Result<PathBuf> {
    let trash = system_trash_dir()
        .ok_or_else(|| TransferError::Unsupported("no system trash is available on this platform".into()))?;
    if cfg!(target_os = "macos") {
        ensure_dir(&trash)?;
        let name = unique_name(&entry_name(src)?, |n| trash.join(n).exists());
        let dest = trash.join(name);
        relocate(src, &dest)?;
        info!(src = %src.display(), dest = %dest.display(), "Moved to system trash");
        return Ok(dest);
    }
    to_freedesktop_trash(&trash, src)
}

fn encode_trash_path(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    raw.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Freedesktop trash: write `info/<name>.trashinfo`, then move into `files/<name>`.
pub(super) fn to_freedesktop_trash(trash_root: &Path, src: &Path) -> Result<PathBuf> {
    let files = trash_root.join("files");
    let info_dir = trash_root.join("info");
    ensure_dir(&files)?;
    ensure_dir(&info_dir)?;

    let name = unique_name(&entry_name(src)?, |n| {
        files.join(n).exists() || info_dir.join(format!("{n}.trashinfo")).exists()
    });
    let info_path = info_dir.join(format!("{name}.trashinfo"));
    let dest = files.join(&name);

    let original = fs::canonicalize(src).map_err(TransferError::io("resolve path to trash", src))?;
    let record = format!(
        "[Trash Info]\nPath={}\nDeletionDate={}\n",
        encode_trash_path(dunce::simplified(&original)),
        Local::now().format("%Y-%m-%dT%H:%M:%S")
    );
    write_new(&info_path, record.as_bytes()).map_err(TransferError::io("write trash info", &info_path))?;

    if let Err(e) = relocate(src, &dest) {
        let _ = fs::remove_file(&info_path);
        return Err(e);
    }
    info!(src = %src.display(), dest = %dest.display(), "Moved to system trash");
    Ok(dest)
}

fn write_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).create_new(true).open(path)?;
    f.write_all(bytes)?;
    f.sync_all()
}
