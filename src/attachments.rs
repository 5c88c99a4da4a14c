//! Attachment copying.
//!
//! Every embed of a note is resolved against the source vault and copied next
//! to the transferred note, keeping the attachment's vault-relative path:
//! `Notes/Todo.md` embedding `assets/a.png`, sent to `/B/Imported/Todo.md`,
//! lands its attachment at `/B/Imported/assets/a.png`.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::{Result, TransferError};
use crate::fs_ops::{ensure_dir, safe_copy_and_rename};
use crate::progress::{ProgressKind, ProgressReporter, ProgressSurface};
use crate::vault::{Note, VaultIndex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachmentSummary {
    pub copied: usize,
    pub failed: usize,
}

/// Strip an anchor (`#heading`, `#page=3`, `#^block`) from an embed link.
pub fn strip_fragment(link: &str) -> &str {
    link.split('#').next().unwrap_or(link)
}

fn as_attachment_error(attachment: &Path, err: TransferError) -> TransferError {
    match err {
        TransferError::Io { source, .. } => TransferError::AttachmentCopy {
            attachment: attachment.to_path_buf(),
            source,
        },
        other => other,
    }
}

fn copy_one(src: &Path, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    safe_copy_and_rename(src, dest)
}

/// Copy every resolvable embed of `note`. Dangling links are skipped; a failed
/// copy is logged and counted, and the remaining attachments are still copied.
pub fn copy_attachments(
    vault: &dyn VaultIndex,
    note: &Note,
    destination_note_path: &Path,
    source_vault_root: &Path,
    surface: &dyn ProgressSurface,
) -> AttachmentSummary {
    let mut summary = AttachmentSummary::default();
    let embeds = vault.embedded_references(note);
    if embeds.is_empty() {
        return summary;
    }
    let Some(dest_folder) = destination_note_path.parent() else {
        warn!(dest = %destination_note_path.display(), "Destination has no parent; attachments skipped");
        return summary;
    };

    let mut progress = ProgressReporter::new(ProgressKind::Attachments, embeds.len(), surface);
    for embed in &embeds {
        let link = strip_fragment(&embed.link);
        let Some(resolved) = vault.resolve_link_target(link, &note.path) else {
            debug!(link = %embed.link, note = %note.path, "Dangling embed skipped");
            continue;
        };
        let src = source_vault_root.join(&resolved.path);
        let dest = dest_folder.join(&resolved.path);
        match copy_one(&src, &dest) {
            Ok(bytes) => {
                summary.copied += 1;
                progress.increment();
                debug!(src = %src.display(), dest = %dest.display(), bytes, "Copied attachment");
            }
            Err(e) => {
                summary.failed += 1;
                let e = as_attachment_error(&src, e);
                warn!(kind = e.kind(), error = %e, "Attachment not copied");
            }
        }
    }
    progress.finish();

    if summary.copied > 0 || summary.failed > 0 {
        info!(note = %note.path, copied = summary.copied, failed = summary.failed, "Attachments processed");
    }
    summary
}
