//! Folder batches: one outcome per note, one shared date, one trash at the end.

use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::collections::BTreeSet;
use std::fs;

use vault_transfer::progress::TracingSurface;
use vault_transfer::{
    DateSource, DateVariable, Folder, FsVault, ProgressState, RecordedNotices, TransferConfig, TransferContext,
    TransferError, TransferStatus, transfer_folder,
};

fn source_vault() -> TempDir {
    let src = TempDir::new().unwrap();
    src.child("Projects.md").write_str("---\ncreated: 2023-05-01\n---\nfolder note").unwrap();
    src.child("Projects/a.md").write_str("a").unwrap();
    src.child("Projects/b.md").write_str("b ![[chart.png]]").unwrap();
    src.child("Projects/Sub/c.md").write_str("c").unwrap();
    src.child("Projects/chart.png").write_binary(b"png").unwrap();
    src
}

fn dated_config(dest: &TempDir) -> TransferConfig {
    let mut config = TransferConfig::new(dest.path(), "Imported/{{YYYY}}");
    config.automatic_create_output_folder = true;
    config.date_variable = DateVariable {
        source: DateSource::Frontmatter,
        frontmatter_key: Some("created".into()),
        fallback: None,
    };
    config
}

#[test]
fn every_note_gets_an_outcome_and_progress_finishes() {
    let src = source_vault();
    let dest = TempDir::new().unwrap();
    let vault = FsVault::open(src.path()).unwrap();
    let mut config = dated_config(&dest);
    config.create_link = false;
    config.delete_original = true;
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let summary = transfer_folder(&ctx, &Folder::new("Projects"), None);

    let sources: Vec<&str> = summary.outcomes.iter().map(|o| o.source.as_str()).collect();
    assert_eq!(
        sources,
        vec!["Projects/a.md", "Projects/b.md", "Projects/chart.png", "Projects/Sub/c.md", "Projects.md"]
    );
    assert!(summary.all_copied());
    assert_eq!(summary.progress, ProgressState::Finished { completed: 5, total: 5 });

    // all files share the folder note's date
    for name in ["a.md", "b.md", "chart.png", "c.md", "Projects.md"] {
        assert!(dest.path().join("Imported/2023").join(name).is_file(), "{name} not copied");
    }
    // embeds keep their vault-relative offset below the note's folder
    assert_eq!(fs::read(dest.path().join("Imported/2023/Projects/chart.png")).unwrap(), b"png");

    // the folder is trashed once, as a whole; the outside folder note stays
    assert!(summary.folder_trashed);
    assert!(!src.child("Projects").path().exists());
    src.child(".trash/Projects/Sub/c.md").assert("c");
    assert!(src.child("Projects.md").path().is_file());
    assert!(notices.contains("Transfer completed. 5 files copied into Imported/2023."));
}

#[test]
fn a_failed_note_keeps_the_folder() {
    let src = source_vault();
    let dest = TempDir::new().unwrap();
    dest.child("Imported/2023/b.md").write_str("already here").unwrap();
    let vault = FsVault::open(src.path()).unwrap();
    let mut config = dated_config(&dest);
    config.create_link = false;
    config.delete_original = true;
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let summary = transfer_folder(&ctx, &Folder::new("Projects"), None);

    assert_eq!(summary.outcomes.len(), 5);
    assert_eq!(summary.copied(), 4);
    assert_eq!(summary.progress, ProgressState::Finished { completed: 5, total: 5 });
    assert!(!summary.folder_trashed);
    src.child("Projects/a.md").assert("a");
    dest.child("Imported/2023/b.md").assert("already here");
    assert!(notices.contains("1 not copied"));
}

#[test]
fn an_io_failure_mid_batch_does_not_stop_later_notes() {
    let src = source_vault();
    let dest = TempDir::new().unwrap();
    // a directory where b.md should land makes the final rename fail
    dest.child("Imported/2023/b.md/occupied").write_str("x").unwrap();
    let vault = FsVault::open(src.path()).unwrap();
    let mut config = dated_config(&dest);
    config.create_link = false;
    config.delete_original = true;
    config.overwrite = true;
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let summary = transfer_folder(&ctx, &Folder::new("Projects"), None);

    assert_eq!(summary.outcomes.len(), 5);
    let b = &summary.outcomes[1];
    assert_eq!(b.source, "Projects/b.md");
    assert!(matches!(b.status, TransferStatus::Failed(TransferError::Io { .. })), "{:?}", b.status);
    for name in ["c.md", "Projects.md"] {
        assert!(dest.path().join("Imported/2023").join(name).is_file(), "{name} not copied");
    }
    assert_eq!(summary.copied(), 4);
    assert_eq!(summary.progress, ProgressState::Finished { completed: 5, total: 5 });
    assert!(!summary.folder_trashed);
    src.child("Projects/b.md").assert("b ![[chart.png]]");
    assert!(notices.contains("Projects was not trashed"));
}

#[test]
fn a_batch_expands_now_once() {
    let src = TempDir::new().unwrap();
    for i in 0..40 {
        src.child(format!("Inbox/note-{i:02}.md")).write_str("x").unwrap();
    }
    let dest = TempDir::new().unwrap();
    let vault = FsVault::open(src.path()).unwrap();
    let mut config = TransferConfig::new(dest.path(), "Batch-{{x}}");
    config.automatic_create_output_folder = true;
    config.create_link = false;
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let summary = transfer_folder(&ctx, &Folder::new("Inbox"), None);

    assert_eq!(summary.outcomes.len(), 40);
    assert!(summary.all_copied());
    let parents: BTreeSet<_> = summary
        .outcomes
        .iter()
        .map(|o| o.destination.as_ref().and_then(|d| d.parent()).map(|p| p.to_path_buf()))
        .collect();
    assert_eq!(parents.len(), 1, "{parents:?}");
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 1);
    // the summary names the expanded folder, not the template
    let batch = fs::read_dir(dest.path()).unwrap().next().unwrap().unwrap().file_name();
    let batch = batch.to_string_lossy();
    assert!(notices.contains(&format!("copied into {batch}.")));
}

#[test]
fn links_replace_every_member_note() {
    let src = source_vault();
    src.child("Projects/Sub/scan.pdf").write_binary(b"%PDF").unwrap();
    let base = TempDir::new().unwrap();
    let work = base.path().join("WorkVault");
    fs::create_dir_all(&work).unwrap();
    let vault = FsVault::open(src.path()).unwrap();
    let mut config = TransferConfig::new(&work, "");
    config.recreate_tree = true;
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let summary = transfer_folder(&ctx, &Folder::new("Projects/Sub"), None);

    assert_eq!(summary.outcomes.len(), 2);
    assert!(work.join("Projects/Sub/c.md").is_file());
    src.child("Projects/Sub/c.md").assert("[c](obsidian://vault/WorkVault/c)");
    // non-markdown files are copied but never overwritten with a link
    assert_eq!(fs::read(src.child("Projects/Sub/scan.pdf").path()).unwrap(), b"%PDF");
    assert_eq!(fs::read(work.join("Projects/Sub/scan.pdf")).unwrap(), b"%PDF");
    assert!(!summary.folder_trashed);
}

#[test]
fn explicit_destination_is_shared_by_the_batch() {
    let src = source_vault();
    let dest = TempDir::new().unwrap();
    let picked = dest.path().join("Picked");
    fs::create_dir_all(&picked).unwrap();
    let vault = FsVault::open(src.path()).unwrap();
    let mut config = TransferConfig::new(dest.path(), "Ignored");
    config.create_link = false;
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let summary = transfer_folder(&ctx, &Folder::new("Projects"), Some(picked.clone()));

    assert!(summary.all_copied());
    for name in ["a.md", "b.md", "c.md", "Projects.md"] {
        assert!(picked.join(name).is_file(), "{name} not copied");
    }
    assert!(!dest.path().join("Ignored").exists());
}

#[test]
fn invalid_config_produces_no_outcomes() {
    let src = source_vault();
    let vault = FsVault::open(src.path()).unwrap();
    let config = TransferConfig::default();
    let notices = RecordedNotices::new();
    let ctx = TransferContext { vault: &vault, config: &config, notices: &notices, surface: &TracingSurface };

    let summary = transfer_folder(&ctx, &Folder::new("Projects"), None);

    assert!(summary.outcomes.is_empty());
    assert!(matches!(summary.progress, ProgressState::Error { .. }));
    assert!(notices.contains("Output vault is not set"));
}
