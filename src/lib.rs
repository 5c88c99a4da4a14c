//! Core library for `vault_transfer`.
//!
//! Copies notes (and the attachments they embed) from one Markdown vault
//! into another, optionally leaving a link to the copy behind in the source
//! note. Host integration is expressed through small traits: [`VaultIndex`]
//! for the source vault, [`EditorBuffer`] for an open editor,
//! [`NoticeSink`] for user notices and [`ProgressSurface`] for progress.
//! [`FsVault`] implements the vault side directly on the filesystem.

pub mod attachments;
pub mod cli;
pub mod config;
pub mod errors;
pub mod folder;
pub mod fs_ops;
pub mod link;
pub mod notice;
pub mod output;
pub mod picker;
pub mod platform;
pub mod progress;
pub mod rewrite;
pub mod transfer;
pub mod vault;

pub use attachments::{AttachmentSummary, copy_attachments};
pub use config::{
    DateFallback, DateSource, DateVariable, LogLevel, OverrideRule, TransferConfig, default_config_path,
    default_log_path, ensure_distinct_vaults, load_config_from_xml_path, path_has_symlink_ancestor,
};
pub use errors::{Result, TransferError};
pub use folder::{FolderSummary, collect_notes, folder_note, transfer_folder};
pub use link::format_link;
pub use notice::{ConsoleNotices, NoticeSink, RecordedNotices};
pub use picker::{Candidate, CandidateTarget, create_destination_folder, destination_candidates};
pub use progress::{ProgressKind, ProgressReporter, ProgressState, ProgressSurface};
pub use rewrite::resolve_output_path;
pub use transfer::{
    TransferContext, TransferOptions, TransferOutcome, TransferStatus, insert_link_to_other_vault, reference_date,
    transfer_note,
};
pub use vault::{EditorBuffer, Entry, Folder, FsVault, Note, TextBuffer, VaultIndex};
