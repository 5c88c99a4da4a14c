//! Single-note transfer.
//!
//! `transfer_note` validates the configuration, computes the destination,
//! prepares the directory, copies attachments and then the note, and finally
//! applies the post-copy policy (link, trash, or nothing). It never returns an
//! error: every failure becomes a notice plus a `Skipped`/`Failed` outcome.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::attachments::{AttachmentSummary, copy_attachments};
use crate::config::{DateFallback, DateSource, TransferConfig};
use crate::errors::{Result, TransferError};
use crate::fs_ops::{ensure_dir, safe_copy_and_rename};
use crate::link::format_link;
use crate::notice::NoticeSink;
use crate::progress::ProgressSurface;
use crate::rewrite::{normalize_path, output_folder_path, resolve_output_path};
use crate::vault::{EditorBuffer, Entry, Note, VaultIndex};

/// Collaborators shared by every transfer of one command invocation.
#[derive(Clone, Copy)]
pub struct TransferContext<'a> {
    pub vault: &'a dyn VaultIndex,
    pub config: &'a TransferConfig,
    pub notices: &'a dyn NoticeSink,
    pub surface: &'a dyn ProgressSurface,
}

#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Part of a folder batch: no per-file notice, deletion deferred to the folder.
    pub recursive: bool,
    /// Destination folder chosen by the user; bypasses path rewriting.
    pub explicit_output_path: Option<PathBuf>,
    /// Instant used for `{{token}}` expansion; `None` pins "now" once per transfer.
    pub reference_date: Option<DateTime<Local>>,
}

#[derive(Debug)]
pub enum TransferStatus {
    Copied,
    /// Refused by policy; nothing was written.
    Skipped(TransferError),
    Failed(TransferError),
}

#[derive(Debug)]
pub struct TransferOutcome {
    /// Vault-relative path of the source note.
    pub source: String,
    /// Destination path, once it could be computed.
    pub destination: Option<PathBuf>,
    pub attachments: AttachmentSummary,
    pub status: TransferStatus,
}

impl TransferOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self.status, TransferStatus::Copied)
    }

    pub fn error(&self) -> Option<&TransferError> {
        match &self.status {
            TransferStatus::Copied => None,
            TransferStatus::Skipped(e) | TransferStatus::Failed(e) => Some(e),
        }
    }
}

/// Parse a frontmatter date: RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`,
/// `YYYY-MM-DDTHH:MM[:SS]`, or integer epoch milliseconds.
pub fn parse_date_value(value: &serde_yaml::Value) -> Option<DateTime<Local>> {
    match value {
        serde_yaml::Value::String(s) => parse_date_str(s),
        serde_yaml::Value::Number(n) => n.as_i64().and_then(|ms| Local.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn parse_date_str(raw: &str) -> Option<DateTime<Local>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(ms) = s.parse::<i64>() {
        return Local.timestamp_millis_opt(ms).single();
    }
    const FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
    let naive = FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Local.from_local_datetime(&naive).earliest()
}

/// Reference date for `note` per the configured date variable.
/// `None` means "now", sampled once by the caller.
pub fn reference_date(vault: &dyn VaultIndex, note: Option<&Note>, config: &TransferConfig) -> Option<DateTime<Local>> {
    let note = note?;
    let dv = &config.date_variable;
    let stat_time = |which: DateFallback| match vault.stat(note) {
        Ok(stat) => Some(match which {
            DateFallback::Creation => stat.ctime,
            DateFallback::Modification => stat.mtime,
        }),
        Err(e) => {
            warn!(note = %note.path, error = %e, "Cannot read note timestamps");
            None
        }
    };
    match dv.source {
        DateSource::Now => None,
        DateSource::Creation => stat_time(DateFallback::Creation),
        DateSource::Modification => stat_time(DateFallback::Modification),
        DateSource::Frontmatter => {
            let key = dv.frontmatter_key.as_deref()?;
            if let Some(value) = vault.frontmatter_field(note, key) {
                if let Some(date) = parse_date_value(&value) {
                    return Some(date);
                }
                debug!(note = %note.path, key, "Frontmatter date not recognised; using fallback");
            }
            dv.fallback.and_then(stat_time)
        }
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Destination folder and note path for `note`. Both are expanded with the
/// same instant, so the folder checked is the folder written to.
fn destination(note: &Note, config: &TransferConfig, options: &TransferOptions) -> (PathBuf, PathBuf) {
    let date = options.reference_date.unwrap_or_else(Local::now);
    let date = Some(&date);
    let (folder, output) = match &options.explicit_output_path {
        Some(explicit) => {
            let folder = normalize_path(&explicit.to_string_lossy());
            let output = normalize_path(&format!("{folder}/{}", note.name));
            (folder, output)
        }
        None => {
            let folder = output_folder_path(config, date);
            let output = if config.recreate_tree {
                resolve_output_path(&note.path, config, date)
            } else {
                normalize_path(&format!("{folder}/{}", note.name))
            };
            (folder, output)
        }
    };
    (PathBuf::from(folder), PathBuf::from(output))
}

fn run(
    ctx: &TransferContext<'_>,
    note: &Note,
    editor: Option<&mut dyn EditorBuffer>,
    options: &TransferOptions,
    outcome: &mut TransferOutcome,
) -> Result<()> {
    let config = ctx.config;
    config.validate()?;
    let base = ctx.vault.base_path().ok_or_else(|| {
        TransferError::Unsupported("the source vault is not stored in a local directory".into())
    })?;

    let (folder, output) = destination(note, config, options);
    outcome.destination = Some(output.clone());

    if !folder.is_dir() {
        if !config.automatic_create_output_folder {
            return Err(TransferError::DirectoryMissing(folder));
        }
        ensure_dir(&folder)?;
    }
    if config.recreate_tree
        && let Some(parent) = output.parent()
    {
        ensure_dir(parent)?;
    }

    let source = base.join(&note.path);
    if output.exists() {
        if is_same_file(&source, &output) {
            return Err(TransferError::Config(format!(
                "destination {} is the note itself",
                output.display()
            )));
        }
        if !config.overwrite {
            return Err(TransferError::FileExists(output));
        }
        debug!(dest = %output.display(), "Destination exists; overwriting");
    }
    if !options.recursive {
        ctx.notices.show(&format!("Copying {} to {}", note.path, output.display()));
    }

    outcome.attachments = copy_attachments(ctx.vault, note, &output, base, ctx.surface);
    if outcome.attachments.failed > 0 {
        ctx.notices.show(&format!(
            "Error: {} attachment(s) of {} could not be copied; see logs for details",
            outcome.attachments.failed, note.path
        ));
    }

    let bytes = safe_copy_and_rename(&source, &output)?;
    info!(
        src = %source.display(),
        dest = %output.display(),
        bytes,
        attachments = outcome.attachments.copied,
        "Copied note"
    );

    if config.create_link && note.is_markdown() {
        let link = format_link(&note.basename, &config.output_vault);
        match editor {
            Some(buffer) => buffer.replace_entire_content(&link),
            None => ctx.vault.write_content(note, &link)?,
        }
        debug!(note = %note.path, %link, "Replaced note with link");
    } else if config.delete_original && !options.recursive {
        ctx.vault
            .trash(&Entry::Note(note.clone()), config.move_to_system_trash)?;
    }
    Ok(())
}

/// Transfer one note. Always resolves to an outcome; failures are reported
/// through the notice sink and never propagate.
pub fn transfer_note(
    ctx: &TransferContext<'_>,
    note: &Note,
    editor: Option<&mut dyn EditorBuffer>,
    options: &TransferOptions,
) -> TransferOutcome {
    let mut outcome = TransferOutcome {
        source: note.path.clone(),
        destination: None,
        attachments: AttachmentSummary::default(),
        status: TransferStatus::Copied,
    };
    if let Err(e) = run(ctx, note, editor, options, &mut outcome) {
        ctx.notices
            .show(&format!("Error: could not transfer {}: {e}", note.path));
        if e.is_policy() {
            info!(kind = e.kind(), note = %note.path, error = %e, "Transfer skipped");
            outcome.status = TransferStatus::Skipped(e);
        } else {
            warn!(kind = e.kind(), note = %note.path, error = %e, "Transfer failed");
            outcome.status = TransferStatus::Failed(e);
        }
    }
    outcome
}

/// Insert the link to `note`'s counterpart in the output vault at the editor
/// selection, without transferring anything.
pub fn insert_link_to_other_vault(
    config: &TransferConfig,
    notices: &dyn NoticeSink,
    note: Option<&Note>,
    editor: &mut dyn EditorBuffer,
) -> Result<String> {
    let result = (|| -> Result<String> {
        config.validate()?;
        let note = note.ok_or_else(|| TransferError::Unsupported("no active note".into()))?;
        let link = format_link(&note.basename, &config.output_vault);
        editor.replace_selection(&link);
        Ok(link)
    })();
    if let Err(e) = &result {
        notices.show(&format!("Error: {e}"));
    }
    result
}
