//! Filesystem-backed vault.
//!
//! Nothing is cached: every query reads the tree, so the index always
//! reflects the files a transfer is about to copy.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::parse::{frontmatter_value, parse_embeds};
use super::trash::{VAULT_TRASH_DIR, to_system_trash, to_vault_trash};
use super::{EmbedRef, Entry, Folder, Note, NoteStat, ResolvedFile, VaultIndex};
use crate::config::DEFAULT_CONFIG_DIR;
use crate::errors::{Result, TransferError};
use crate::rewrite::normalize_path;

#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    config_dir: String,
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

impl FsVault {
    /// Open the vault rooted at `root`, which must be an existing directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let canonical = fs::canonicalize(root).map_err(TransferError::io("open vault", root))?;
        if !canonical.is_dir() {
            return Err(TransferError::NotFound(root.to_path_buf()));
        }
        Ok(Self {
            root: dunce::simplified(&canonical).to_path_buf(),
            config_dir: DEFAULT_CONFIG_DIR.to_string(),
        })
    }

    /// Name of the host settings directory inside the vault.
    pub fn with_config_dir(mut self, config_dir: impl Into<String>) -> Self {
        self.config_dir = config_dir.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> &str {
        &self.config_dir
    }

    /// Vault-relative form of `path`, which may be absolute or relative to the root.
    /// `None` when it points outside the vault.
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let rel = if path.is_absolute() {
            let abs = fs::canonicalize(path)
                .map(|p| dunce::simplified(&p).to_path_buf())
                .unwrap_or_else(|_| path.to_path_buf());
            abs.strip_prefix(&self.root).ok()?.to_string_lossy().into_owned()
        } else {
            path.to_string_lossy().into_owned()
        };
        let normalized = normalize_path(&rel);
        let trimmed = normalized.trim_matches('/');
        if trimmed == ".." || trimmed.starts_with("../") {
            return None;
        }
        Some(trimmed.to_string())
    }

    fn absolute(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    /// Every visible file in the vault, as sorted vault-relative paths.
    fn all_files(&self) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !is_hidden(&e.file_name().to_string_lossy()))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        files.sort();
        files
    }

    fn read_note(&self, note: &Note) -> Option<String> {
        let abs = self.absolute(&note.path);
        match fs::read_to_string(&abs) {
            Ok(s) => Some(s),
            Err(e) => {
                debug!(path = %abs.display(), error = %e, "Note is not readable as text");
                None
            }
        }
    }

    fn existing_file(&self, rel: &str) -> Option<ResolvedFile> {
        let rel = rel.trim_start_matches('/');
        if rel.is_empty() || rel == ".." || rel.starts_with("../") {
            return None;
        }
        if rel.split('/').any(is_hidden) {
            return None;
        }
        self.absolute(rel).is_file().then(|| ResolvedFile {
            path: rel.to_string(),
            name: crate::rewrite::file_name(rel).to_string(),
        })
    }
}

fn has_extension(link: &str) -> bool {
    crate::rewrite::file_name(link)
        .rfind('.')
        .is_some_and(|idx| idx > 0)
}

impl VaultIndex for FsVault {
    fn base_path(&self) -> Option<&Path> {
        Some(&self.root)
    }

    fn entry_at(&self, path: &str) -> Option<Entry> {
        let normalized = normalize_path(path);
        let rel = normalized.trim_matches('/');
        if rel == ".." || rel.starts_with("../") {
            return None;
        }
        let meta = fs::metadata(self.absolute(rel)).ok()?;
        if meta.is_dir() {
            Some(Entry::Folder(Folder::new(rel)))
        } else if meta.is_file() {
            Some(Entry::Note(Note::new(rel)))
        } else {
            None
        }
    }

    fn children(&self, folder: &Folder) -> Vec<Entry> {
        let dir = self.absolute(&folder.path);
        let Ok(read) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut entries: Vec<(String, bool)> = read
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                if is_hidden(&name) {
                    return None;
                }
                let is_dir = e.file_type().ok()?.is_dir();
                Some((name, is_dir))
            })
            .collect();
        entries.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()).then_with(|| a.0.cmp(&b.0)));
        entries
            .into_iter()
            .map(|(name, is_dir)| {
                let path = folder.child_path(&name);
                if is_dir {
                    Entry::Folder(Folder::new(path))
                } else {
                    Entry::Note(Note::new(path))
                }
            })
            .collect()
    }

    fn embedded_references(&self, note: &Note) -> Vec<EmbedRef> {
        self.read_note(note).map(|c| parse_embeds(&c)).unwrap_or_default()
    }

    /// Relative-to-note and vault-absolute paths win; otherwise the shortest
    /// vault path ending in the link (case-insensitive), preferring the note's
    /// own folder. Links without an extension also match `.md` notes.
    fn resolve_link_target(&self, link: &str, from_path: &str) -> Option<ResolvedFile> {
        let link = normalize_path(link.trim());
        let link = link.trim_start_matches('/');
        if link.is_empty() {
            return None;
        }
        let from_dir = Note::new(from_path).parent_path().to_string();
        let relative = if from_dir.is_empty() {
            link.to_string()
        } else {
            normalize_path(&format!("{from_dir}/{link}"))
        };

        let mut direct = vec![relative.clone(), link.to_string()];
        if !has_extension(link) {
            direct.push(format!("{relative}.md"));
            direct.push(format!("{link}.md"));
        }
        if let Some(found) = direct.iter().find_map(|p| self.existing_file(p)) {
            return Some(found);
        }

        let target = link.to_lowercase();
        let target_md = (!has_extension(link)).then(|| format!("{target}.md"));
        let suffix_match = |file: &str, t: &str| file == t || file.ends_with(&format!("/{t}"));
        let mut candidates: Vec<String> = self
            .all_files()
            .into_iter()
            .filter(|f| {
                let lower = f.to_lowercase();
                suffix_match(&lower, &target)
                    || target_md.as_deref().is_some_and(|t| suffix_match(&lower, t))
            })
            .collect();
        candidates.sort_by_key(|f| {
            let same_folder = Note::new(f.as_str()).parent_path() == from_dir;
            (!same_folder, f.matches('/').count(), f.clone())
        });
        candidates.into_iter().next().map(|path| {
            let name = crate::rewrite::file_name(&path).to_string();
            ResolvedFile { path, name }
        })
    }

    fn frontmatter_field(&self, note: &Note, key: &str) -> Option<serde_yaml::Value> {
        frontmatter_value(&self.read_note(note)?, key)
    }

    fn stat(&self, note: &Note) -> Result<NoteStat> {
        let abs = self.absolute(&note.path);
        let meta = fs::metadata(&abs).map_err(TransferError::io("stat note", &abs))?;
        let modified = meta.modified().map_err(TransferError::io("read modification time", &abs))?;
        // Some filesystems do not record a birth time.
        let created = meta.created().unwrap_or(modified);
        Ok(NoteStat {
            ctime: created.into(),
            mtime: modified.into(),
        })
    }

    fn write_content(&self, note: &Note, text: &str) -> Result<()> {
        let abs = self.absolute(&note.path);
        fs::write(&abs, text).map_err(TransferError::io("write note", &abs))
    }

    fn trash(&self, entry: &Entry, system: bool) -> Result<()> {
        let rel = entry.path();
        if rel.is_empty() {
            return Err(TransferError::Unsupported("refusing to trash the vault root".into()));
        }
        if rel == VAULT_TRASH_DIR || rel.starts_with(&format!("{VAULT_TRASH_DIR}/")) {
            return Err(TransferError::Unsupported(format!("{rel} is already in the trash")));
        }
        let src = self.absolute(rel);
        if system {
            to_system_trash(&src)?;
        } else {
            to_vault_trash(&self.root, &src)?;
        }
        Ok(())
    }
}
