//! Backlink generation.
//!
//! A transferred note is replaced by a markdown link addressing the copy by
//! name inside the destination vault:
//! `[Todo](obsidian://vault/WorkVault/Todo)`.

use std::path::Path;

use crate::rewrite::normalize_path;

const URI_PREFIX: &str = "obsidian://vault";

/// Leaf directory name of a vault root, used as the vault identifier.
pub fn vault_name(vault_root: &Path) -> String {
    let normalized = normalize_path(&vault_root.to_string_lossy());
    normalized
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Build the single-line markdown link for `display_name` in the vault at `vault_root`.
/// The target is not checked for existence.
pub fn format_link(display_name: &str, vault_root: &Path) -> String {
    let vault = urlencoding::encode(&vault_name(vault_root)).into_owned();
    let file = urlencoding::encode(display_name).into_owned();
    // Brackets and line breaks in the label would break the link syntax.
    let label: String = display_name
        .chars()
        .map(|c| match c {
            '\r' | '\n' => ' ',
            c => c,
        })
        .collect::<String>()
        .replace('[', "\\[")
        .replace(']', "\\]");
    format!("[{label}]({URI_PREFIX}/{vault}/{file})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn plain_name() {
        assert_eq!(
            format_link("Todo", &PathBuf::from("/home/me/WorkVault")),
            "[Todo](obsidian://vault/WorkVault/Todo)"
        );
    }

    #[test]
    fn trailing_separator_and_backslashes() {
        assert_eq!(vault_name(Path::new("/home/me/WorkVault/")), "WorkVault");
        assert_eq!(vault_name(Path::new(r"C:\Users\me\Work Vault")), "Work Vault");
    }

    #[test]
    fn names_are_percent_encoded() {
        assert_eq!(
            format_link("Meeting notes #3", Path::new("/v/Work Vault")),
            "[Meeting notes #3](obsidian://vault/Work%20Vault/Meeting%20notes%20%233)"
        );
    }

    #[test]
    fn link_stays_on_one_line() {
        let link = format_link("a]b\nc", Path::new("/v/B"));
        assert!(!link.contains('\n'));
        assert!(link.starts_with("[a\\]b c]("));
    }
}
