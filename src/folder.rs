//! Folder transfer.
//!
//! Every note under a folder is collected depth-first with an explicit stack
//! (no recursion, so deep trees cannot exhaust the call stack), the folder's
//! own note is appended, and each note goes through `transfer_note` with one
//! shared reference date. Trashing the source folder happens once, after the
//! whole batch.

use chrono::Local;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::progress::{ProgressKind, ProgressReporter, ProgressState};
use crate::rewrite::{expand_date_template, normalize_path};
use crate::transfer::{TransferContext, TransferOptions, TransferOutcome, reference_date, transfer_note};
use crate::vault::{Entry, Folder, Note, VaultIndex};

#[derive(Debug)]
pub struct FolderSummary {
    pub folder: String,
    pub outcomes: Vec<TransferOutcome>,
    /// Final state of the batch reporter.
    pub progress: ProgressState,
    pub folder_trashed: bool,
}

impl FolderSummary {
    pub fn copied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_copied()).count()
    }

    pub fn all_copied(&self) -> bool {
        self.outcomes.iter().all(TransferOutcome::is_copied)
    }
}

/// Every note below `folder`, depth-first, each folder's children in the
/// vault's natural order.
pub fn collect_notes(vault: &dyn VaultIndex, folder: &Folder) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut stack: Vec<Entry> = vault.children(folder).into_iter().rev().collect();
    while let Some(entry) = stack.pop() {
        match entry {
            Entry::Note(note) => notes.push(note),
            Entry::Folder(sub) => stack.extend(vault.children(&sub).into_iter().rev()),
        }
    }
    notes
}

/// The note representing `folder`: `<parent>/<name>.md`, else
/// `<folder>/<name>.md`, else `<folder>/index.md`.
pub fn folder_note(vault: &dyn VaultIndex, folder: &Folder) -> Option<Note> {
    if folder.is_root() {
        return None;
    }
    let outside = if folder.parent_path().is_empty() {
        format!("{}.md", folder.name)
    } else {
        format!("{}/{}.md", folder.parent_path(), folder.name)
    };
    let candidates = [
        outside,
        folder.child_path(&format!("{}.md", folder.name)),
        folder.child_path("index.md"),
    ];
    candidates.iter().find_map(|path| match vault.entry_at(path) {
        Some(Entry::Note(note)) => Some(note),
        _ => None,
    })
}

/// Transfer every note of `folder`. Produces one outcome per collected note.
pub fn transfer_folder(
    ctx: &TransferContext<'_>,
    folder: &Folder,
    explicit_output_path: Option<PathBuf>,
) -> FolderSummary {
    let config = ctx.config;
    let mut summary = FolderSummary {
        folder: folder.path.clone(),
        outcomes: Vec::new(),
        progress: ProgressState::Idle { total: 0 },
        folder_trashed: false,
    };

    if let Err(e) = config.validate() {
        ctx.notices.show(&format!("Error: could not transfer {}: {e}", folder.path));
        let mut progress = ProgressReporter::new(ProgressKind::Files, 0, ctx.surface);
        progress.error();
        summary.progress = progress.state();
        return summary;
    }

    let mut notes = collect_notes(ctx.vault, folder);
    let representative = folder_note(ctx.vault, folder);
    if let Some(note) = &representative
        && !notes.contains(note)
    {
        notes.push(note.clone());
    }
    let date = reference_date(ctx.vault, representative.as_ref(), config).unwrap_or_else(Local::now);
    debug!(
        folder = %folder.path,
        notes = notes.len(),
        folder_note = representative.as_ref().map(|n| n.path.as_str()).unwrap_or("<none>"),
        ?date,
        "Collected folder"
    );

    let options = TransferOptions {
        recursive: true,
        explicit_output_path: explicit_output_path.clone(),
        reference_date: Some(date),
    };
    let mut progress = ProgressReporter::new(ProgressKind::Files, notes.len(), ctx.surface);
    for note in &notes {
        summary.outcomes.push(transfer_note(ctx, note, None, &options));
        progress.increment();
    }

    if config.delete_original && !config.create_link {
        if summary.all_copied() {
            match ctx
                .vault
                .trash(&Entry::Folder(folder.clone()), config.move_to_system_trash)
            {
                Ok(()) => summary.folder_trashed = true,
                Err(e) => {
                    warn!(kind = e.kind(), folder = %folder.path, error = %e, "Folder not trashed");
                    ctx.notices.show(&format!("Error: could not trash {}: {e}", folder.path));
                }
            }
        } else {
            ctx.notices.show(&format!(
                "Error: {} was not trashed because some notes were not copied",
                folder.path
            ));
        }
    }

    let destination = explicit_output_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| normalize_path(&expand_date_template(&config.output_folder, Some(&date))));
    let copied = summary.copied();
    let failed = summary.outcomes.len() - copied;
    let mut message = format!("Transfer completed. {copied} files copied into {destination}.");
    if failed > 0 {
        message.push_str(&format!(" {failed} not copied."));
    }
    message.push_str(" See logs for details!");
    ctx.notices.show(&message);

    let transferred: Vec<&str> = summary
        .outcomes
        .iter()
        .filter(|o| o.is_copied())
        .map(|o| o.source.as_str())
        .collect();
    info!(folder = %folder.path, copied, failed, files = ?transferred, "Folder transfer finished");

    progress.finish();
    summary.progress = progress.state();
    summary
}
