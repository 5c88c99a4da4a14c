//! I/O error enrichment.
//!
//! Notices must be diagnosable without the logs, so io errors coming out of
//! the filesystem boundary are rewritten as "<op> '<path>': <error> (<hint>)".
//!
//! Usage (keeps the ErrorKind):
//!   File::open(p).map_err(io_error_with_help_io("open file", p))?;

use std::io;
use std::path::Path;

/// Platform hint for a raw OS error code, when we know a useful one.
#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        libc::EACCES | libc::EPERM => "permission denied; check ownership and write permissions.",
        libc::EXDEV => "cross-filesystem; atomic rename not possible.",
        libc::EBUSY => "resource busy; ensure no other process is writing.",
        libc::ENOENT => "path not found; verify it exists.",
        libc::EEXIST => "already exists; enable overwrite or remove the target.",
        libc::ENOSPC => "insufficient space on device.",
        libc::EROFS => "read-only filesystem; cannot write here.",
        libc::ELOOP => "too many symbolic link levels (ELOOP); possible symlink cycle.",
        libc::ENAMETOOLONG => "filename or path too long; shorten path segments or rewrite rules.",
        libc::ENOTDIR => "a path component is a file, not a directory.",
        _ => return None,
    };
    Some(hint)
}

#[cfg(windows)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        5 => "access denied; check permissions.",
        17 => "not same device; cross-filesystem move.",
        32 => "sharing violation; file is in use.",
        2 | 3 => "path not found; verify it exists.",
        80 => "already exists; enable overwrite or remove the target.",
        112 => "insufficient disk space.",
        19 => "write protected / read-only media.",
        206 => "filename or path too long (MAX_PATH exceeded).",
        _ => return None,
    };
    Some(hint)
}

#[cfg(not(any(unix, windows)))]
fn os_hint(_code: i32) -> Option<&'static str> {
    None
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions."),
        io::ErrorKind::NotFound => Some("path not found; verify it exists."),
        io::ErrorKind::AlreadyExists => Some("already exists; enable overwrite or remove the target."),
        _ => None,
    }
}

fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    match e.raw_os_error() {
        Some(code) => {
            if let Some(hint) = os_hint(code) {
                msg.push_str(&format!(" ({hint})"));
            }
            msg.push_str(&format!(" [os code: {}]", code));
        }
        None => {
            if let Some(hint) = kind_hint(e.kind()) {
                msg.push_str(&format!(" ({hint})"));
            }
        }
    }
    msg
}

/// Preserves the original ErrorKind.
pub fn io_error_with_help_io<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}
