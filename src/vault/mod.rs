//! The vault seen by a transfer.
//!
//! `VaultIndex` is the read/write surface a transfer needs from the source
//! vault; `FsVault` implements it directly on a directory tree. Entries are
//! resolved once into the `Entry` sum type so callers never re-inspect the
//! filesystem to tell notes from folders.

mod editor;
mod fs_vault;
mod parse;
mod trash;

use chrono::{DateTime, Local};
use std::path::Path;

use crate::errors::Result;

pub use editor::{EditorBuffer, TextBuffer};
pub use fs_vault::FsVault;
pub use parse::{parse_embeds, split_frontmatter};

/// A file inside a vault, addressed by its vault-relative `/`-separated path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub path: String,
    /// File name with extension.
    pub name: String,
    /// File name without extension; the display name.
    pub basename: String,
}

impl Note {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = crate::rewrite::file_name(&path).to_string();
        let basename = match name.rfind('.') {
            Some(idx) if idx > 0 => name[..idx].to_string(),
            _ => name.clone(),
        };
        Self { path, name, basename }
    }

    /// Vault-relative path of the containing folder ("" for the root).
    pub fn parent_path(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(parent, _)| parent)
    }

    /// Markdown notes can carry embeds and be replaced by a link; other files are copied as-is.
    pub fn is_markdown(&self) -> bool {
        self.name.len() > self.basename.len() && self.name[self.basename.len()..].eq_ignore_ascii_case(".md")
    }
}

/// A directory inside a vault. The root has an empty path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub path: String,
    pub name: String,
}

impl Folder {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = crate::rewrite::file_name(&path).to_string();
        Self { path, name }
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Vault-relative path of the parent folder ("" for top-level folders and the root).
    pub fn parent_path(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(parent, _)| parent)
    }

    /// Vault-relative path of a child named `name`.
    pub fn child_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Note(Note),
    Folder(Folder),
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::Note(n) => &n.path,
            Entry::Folder(f) => &f.path,
        }
    }
}

/// Creation and modification instants of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteStat {
    pub ctime: DateTime<Local>,
    pub mtime: DateTime<Local>,
}

/// One embed recorded in a note (`![[link]]` or `![](link)`), fragment included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedRef {
    pub link: String,
}

/// A link target that resolved to an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Vault-relative path.
    pub path: String,
    pub name: String,
}

/// What a transfer needs from the source vault.
pub trait VaultIndex {
    /// Absolute root of a filesystem-backed vault; `None` when the vault has no
    /// directory on disk, which makes byte-level copies impossible.
    fn base_path(&self) -> Option<&Path>;

    fn entry_at(&self, path: &str) -> Option<Entry>;

    /// Immediate children of `folder`, in the vault's natural (stable) order.
    fn children(&self, folder: &Folder) -> Vec<Entry>;

    fn embedded_references(&self, note: &Note) -> Vec<EmbedRef>;

    /// Resolve a link (fragment already stripped) the way the host resolves it from `from_path`.
    fn resolve_link_target(&self, link: &str, from_path: &str) -> Option<ResolvedFile>;

    fn frontmatter_field(&self, note: &Note, key: &str) -> Option<serde_yaml::Value>;

    fn stat(&self, note: &Note) -> Result<NoteStat>;

    fn write_content(&self, note: &Note, text: &str) -> Result<()>;

    /// Move a note or folder to the vault trash, or to the OS trash when `system` is set.
    fn trash(&self, entry: &Entry, system: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names() {
        let n = Note::new("Notes/Daily/2023-05-01.md");
        assert_eq!(n.name, "2023-05-01.md");
        assert_eq!(n.basename, "2023-05-01");
        assert_eq!(n.parent_path(), "Notes/Daily");
        assert_eq!(Note::new("Todo.md").parent_path(), "");
        assert_eq!(Note::new(".hidden").basename, ".hidden");
    }

    #[test]
    fn markdown_detection() {
        assert!(Note::new("Notes/Todo.md").is_markdown());
        assert!(Note::new("README.MD").is_markdown());
        assert!(!Note::new("assets/diagram.png").is_markdown());
        assert!(!Note::new(".md").is_markdown());
    }

    #[test]
    fn folder_paths() {
        let root = Folder::new("");
        assert!(root.is_root());
        assert_eq!(root.child_path("Projects"), "Projects");
        let f = Folder::new("Projects/Alpha");
        assert_eq!(f.name, "Alpha");
        assert_eq!(f.parent_path(), "Projects");
        assert_eq!(f.child_path("index.md"), "Projects/Alpha/index.md");
    }
}
