//! Destination candidates for "Transfer to...".
//!
//! Order: the output vault's immediate subfolders (sorted, host config dir
//! and hidden dirs excluded), then the vault root labelled with its leaf
//! name, then the "Create new folder" sentinel.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::TransferConfig;
use crate::errors::{Result, TransferError};
use crate::fs_ops::ensure_dir;
use crate::link::vault_name;

pub const CREATE_NEW_FOLDER: &str = "Create new folder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateTarget {
    Folder(PathBuf),
    VaultRoot(PathBuf),
    CreateNewFolder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub label: String,
    pub target: CandidateTarget,
}

impl Candidate {
    /// Absolute destination folder, `None` for the create-new sentinel.
    pub fn output_path(&self) -> Option<&Path> {
        match &self.target {
            CandidateTarget::Folder(p) | CandidateTarget::VaultRoot(p) => Some(p),
            CandidateTarget::CreateNewFolder => None,
        }
    }
}

pub fn destination_candidates(config: &TransferConfig) -> Result<Vec<Candidate>> {
    if !config.has_output_vault() {
        return Err(TransferError::Config(
            "Output vault is not set; configure output_vault before transferring".into(),
        ));
    }
    let vault = config.output_vault.as_path();
    let entries = fs::read_dir(vault).map_err(TransferError::io("list output vault", vault))?;

    let mut folders: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(str::to_owned))
        .filter(|name| name != &config.config_dir && !name.starts_with('.'))
        .collect();
    folders.sort();

    let mut candidates: Vec<Candidate> = folders
        .into_iter()
        .map(|name| Candidate {
            target: CandidateTarget::Folder(vault.join(&name)),
            label: name,
        })
        .collect();
    candidates.push(Candidate {
        label: vault_name(vault),
        target: CandidateTarget::VaultRoot(vault.to_path_buf()),
    });
    candidates.push(Candidate {
        label: CREATE_NEW_FOLDER.to_string(),
        target: CandidateTarget::CreateNewFolder,
    });
    debug!(vault = %vault.display(), count = candidates.len(), "Listed destination candidates");
    Ok(candidates)
}

/// First candidate whose label matches exactly.
pub fn find_candidate<'c>(candidates: &'c [Candidate], label: &str) -> Option<&'c Candidate> {
    candidates.iter().find(|c| c.label == label)
}

/// Create `name` directly under the output vault and return its path.
pub fn create_destination_folder(config: &TransferConfig, name: &str) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(TransferError::Config(format!("Invalid folder name: '{name}'")));
    }
    if !config.has_output_vault() {
        return Err(TransferError::Config(
            "Output vault is not set; configure output_vault before transferring".into(),
        ));
    }
    let path = config.output_vault.join(name);
    ensure_dir(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn lists_subfolders_then_root_then_sentinel() {
        let out = assert_fs::TempDir::new().unwrap();
        out.child("Projects").create_dir_all().unwrap();
        out.child("Archive").create_dir_all().unwrap();
        out.child(".obsidian").create_dir_all().unwrap();
        out.child(".trash").create_dir_all().unwrap();
        out.child("loose.md").write_str("x").unwrap();

        let config = TransferConfig::new(out.path(), "");
        let labels: Vec<String> = destination_candidates(&config).unwrap().into_iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            vec!["Archive".to_string(), "Projects".to_string(), vault_name(out.path()), CREATE_NEW_FOLDER.to_string()]
        );
    }

    #[test]
    fn custom_config_dir_is_hidden() {
        let out = assert_fs::TempDir::new().unwrap();
        out.child("settings").create_dir_all().unwrap();
        out.child("Notes").create_dir_all().unwrap();
        let mut config = TransferConfig::new(out.path(), "");
        config.config_dir = "settings".into();
        let candidates = destination_candidates(&config).unwrap();
        assert!(find_candidate(&candidates, "settings").is_none());
        assert_eq!(
            find_candidate(&candidates, "Notes").unwrap().output_path(),
            Some(out.path().join("Notes").as_path())
        );
        assert!(find_candidate(&candidates, CREATE_NEW_FOLDER).unwrap().output_path().is_none());
    }

    #[test]
    fn unset_vault_is_config_error() {
        let err = destination_candidates(&TransferConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn creates_new_folder_and_rejects_nested_names() {
        let out = assert_fs::TempDir::new().unwrap();
        let config = TransferConfig::new(out.path(), "");
        let created = create_destination_folder(&config, " Inbox ").unwrap();
        assert_eq!(created, out.path().join("Inbox"));
        assert!(created.is_dir());
        assert_eq!(create_destination_folder(&config, "a/b").unwrap_err().kind(), "config");
        assert_eq!(create_destination_folder(&config, "..").unwrap_err().kind(), "config");
    }
}
