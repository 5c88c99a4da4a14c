//! Destination path computation.
//!
//! Everything here is pure: no filesystem access, and the output depends only on
//! the note path, the configuration and the reference date.
//!
//! Rules (removal, then override) are applied to the part of the path that comes
//! from the source vault: the note's vault-relative path when the tree is
//! recreated, its file name otherwise. Anchors such as `^Notes/` therefore match
//! the start of the note path rather than the destination vault root.

mod date;
mod rules;

pub use date::{expand_date_template, format_moment};
pub use rules::{
    apply_overrides, compile_override, compile_removal, expand_replacement, parse_regex_literal, remove_parts,
};

use chrono::{DateTime, Local};

use crate::config::TransferConfig;

/// Compute the destination of `note_path` (vault-relative, `/`-separated).
pub fn resolve_output_path(
    note_path: &str,
    config: &TransferConfig,
    date: Option<&DateTime<Local>>,
) -> String {
    let folder = output_folder_path(config, date);
    let tail = if config.recreate_tree {
        normalize_path(note_path)
    } else {
        file_name(note_path).to_string()
    };
    let tail = remove_parts(&tail, &config.remove_path);
    let tail = apply_overrides(&tail, &config.override_path, date);
    normalize_path(&format!("{folder}/{tail}"))
}

/// `outputVault/outputFolder` with the folder template date-expanded.
pub fn output_folder_path(config: &TransferConfig, date: Option<&DateTime<Local>>) -> String {
    let vault = config.output_vault.to_string_lossy();
    let folder = expand_date_template(&config.output_folder, date);
    normalize_path(&format!("{vault}/{folder}"))
}

/// Normalize separators and collapse redundant segments.
///
/// - `\` becomes `/`, runs of `/` collapse, trailing `/` is dropped
/// - `.` segments vanish; `..` consumes the previous segment when there is one
/// - a leading `/` (absolute path) is kept
/// - non-breaking spaces become plain spaces
pub fn normalize_path(path: &str) -> String {
    let cleaned: String = path
        .chars()
        .map(|c| match c {
            '\\' => '/',
            '\u{00A0}' | '\u{202F}' => ' ',
            c => c,
        })
        .collect();
    let absolute = cleaned.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for seg in cleaned.split('/') {
        match seg {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            s => segments.push(s),
        }
    }

    let joined = segments.join("/");
    if absolute { format!("/{joined}") } else { joined }
}

/// Last `/`-separated segment of a path.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}
