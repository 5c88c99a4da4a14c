//! End-to-end single-note transfers between two real directories.

use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::fs;
use std::path::PathBuf;

use vault_transfer::progress::TracingSurface;
use vault_transfer::{
    AttachmentSummary, Entry, FsVault, RecordedNotices, TransferConfig, TransferContext, TransferError,
    TransferOptions, TransferStatus, VaultIndex, transfer_note,
};

/// Source vault plus a destination vault whose leaf is `WorkVault`.
fn vaults() -> (TempDir, TempDir, PathBuf) {
    let src = TempDir::new().unwrap();
    src.child("Notes/Todo.md")
        .write_str("- [ ] call back\n![[diagram.png]]\n![[missing.png]]\n")
        .unwrap();
    src.child("attachments/diagram.png").write_binary(&[0x89, b'P', b'N', b'G']).unwrap();
    src.child("Archive/Note.md").write_str("old").unwrap();

    let base = TempDir::new().unwrap();
    let work = base.path().join("WorkVault");
    fs::create_dir_all(work.join("Imported")).unwrap();
    (src, base, work)
}

fn note(vault: &FsVault, path: &str) -> vault_transfer::Note {
    match vault.entry_at(path) {
        Some(Entry::Note(n)) => n,
        other => panic!("expected a note at {path}, got {other:?}"),
    }
}

#[test]
fn flat_copy_with_link_and_attachments() {
    let (src, _base, work) = vaults();
    let vault = FsVault::open(src.path()).unwrap();
    let config = TransferConfig::new(&work, "Imported");
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let original = fs::read(src.child("Notes/Todo.md").path()).unwrap();
    let outcome = transfer_note(&ctx, &note(&vault, "Notes/Todo.md"), None, &TransferOptions::default());

    assert!(outcome.is_copied(), "{:?}", outcome.status);
    let dest = work.join("Imported/Todo.md");
    assert_eq!(outcome.destination.as_deref(), Some(dest.as_path()));
    assert_eq!(fs::read(&dest).unwrap(), original);
    assert_eq!(
        fs::read(work.join("Imported/attachments/diagram.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
    // dangling embed is skipped, not counted as a failure
    assert_eq!(outcome.attachments, AttachmentSummary { copied: 1, failed: 0 });
    src.child("Notes/Todo.md").assert("[Todo](obsidian://vault/WorkVault/Todo)");
    assert!(notices.contains("Copying Notes/Todo.md"));
}

#[test]
fn one_failed_attachment_does_not_stop_the_others() {
    let (src, _base, work) = vaults();
    src.child("Notes/Todo.md")
        .write_str("![[diagram.png]]\n![[photo.jpg]]\n")
        .unwrap();
    src.child("media/photo.jpg").write_binary(b"JPG").unwrap();
    // a file where the attachments folder should be blocks diagram.png only
    fs::write(work.join("Imported/attachments"), b"in the way").unwrap();
    let vault = FsVault::open(src.path()).unwrap();
    let mut config = TransferConfig::new(&work, "Imported");
    config.create_link = false;
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let outcome = transfer_note(&ctx, &note(&vault, "Notes/Todo.md"), None, &TransferOptions::default());

    assert!(outcome.is_copied(), "{:?}", outcome.status);
    assert_eq!(outcome.attachments, AttachmentSummary { copied: 1, failed: 1 });
    assert_eq!(fs::read(work.join("Imported/media/photo.jpg")).unwrap(), b"JPG");
    assert!(work.join("Imported/Todo.md").is_file());
    assert!(notices.contains("Error: 1 attachment(s) of Notes/Todo.md could not be copied"));
}

#[test]
fn recreated_tree_with_removal_rule() {
    let (src, _base, work) = vaults();
    let vault = FsVault::open(src.path()).unwrap();
    let mut config = TransferConfig::new(&work, "Imported");
    config.recreate_tree = true;
    config.create_link = false;
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };
    let outcome = transfer_note(&ctx, &note(&vault, "Notes/Todo.md"), None, &TransferOptions::default());
    assert!(outcome.is_copied());
    assert!(work.join("Imported/Notes/Todo.md").is_file());

    config.remove_path = vec!["^Notes/".into()];
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };
    let outcome = transfer_note(&ctx, &note(&vault, "Notes/Todo.md"), None, &TransferOptions::default());
    assert!(outcome.is_copied());
    assert_eq!(outcome.destination, Some(work.join("Imported/Todo.md")));
    // source untouched without a link
    let content = fs::read_to_string(src.child("Notes/Todo.md").path()).unwrap();
    assert!(content.starts_with("- [ ] call back"));
}

#[test]
fn missing_output_folder_without_auto_create() {
    let (src, _base, work) = vaults();
    let vault = FsVault::open(src.path()).unwrap();
    let config = TransferConfig::new(&work, "Nowhere");
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let outcome = transfer_note(&ctx, &note(&vault, "Notes/Todo.md"), None, &TransferOptions::default());
    assert!(matches!(outcome.status, TransferStatus::Skipped(TransferError::DirectoryMissing(_))));
    assert!(!work.join("Nowhere").exists());
    assert!(!work.join("Imported/attachments").exists());
    assert!(notices.contains("Notes/Todo.md"));
}

#[test]
fn delete_original_moves_note_to_vault_trash() {
    let (src, _base, work) = vaults();
    let vault = FsVault::open(src.path()).unwrap();
    let mut config = TransferConfig::new(&work, "Imported");
    config.create_link = false;
    config.delete_original = true;
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let outcome = transfer_note(&ctx, &note(&vault, "Archive/Note.md"), None, &TransferOptions::default());
    assert!(outcome.is_copied());
    assert!(!src.child("Archive/Note.md").path().exists());
    src.child(".trash/Note.md").assert("old");
    assert_eq!(fs::read_to_string(work.join("Imported/Note.md")).unwrap(), "old");
}
