//! Typed error definitions for vault_transfer.
//! Provides the well-known failure modes of a transfer for better notices, logs and tests.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::fs_ops::io_error_with_help_io;

#[derive(Debug, Error)]
pub enum TransferError {
    /// Configuration is unusable (destination vault unset, invalid rule, ...).
    #[error("{0}")]
    Config(String),

    #[error("Directory does not exist at {0}")]
    DirectoryMissing(PathBuf),

    #[error("File already exists: {0}")]
    FileExists(PathBuf),

    #[error("Failed to copy attachment {attachment}: {source}")]
    AttachmentCopy {
        attachment: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source message already carries the operation, path and an OS hint.
    #[error("{source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Nothing found at {0}")]
    NotFound(PathBuf),

    #[error("Invalid rule '{rule}': {source}")]
    InvalidRule {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0}")]
    Unsupported(String),
}

impl TransferError {
    /// Short stable identifier, used as the `kind` field in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::Config(_) => "config",
            TransferError::DirectoryMissing(_) => "directory_missing",
            TransferError::FileExists(_) => "file_exists",
            TransferError::AttachmentCopy { .. } => "attachment_copy",
            TransferError::Io { .. } => "io",
            TransferError::NotFound(_) => "not_found",
            TransferError::InvalidRule { .. } => "invalid_rule",
            TransferError::Unsupported(_) => "unsupported",
        }
    }

    /// Refusals decided by configuration or destination state. Nothing was written.
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            TransferError::Config(_)
                | TransferError::DirectoryMissing(_)
                | TransferError::FileExists(_)
                | TransferError::InvalidRule { .. }
        )
    }

    /// Adapter for `.map_err(...)` on raw io results at the filesystem boundary.
    /// The io error is enriched with operation, path and platform hints.
    pub fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |e| {
            let source = io_error_with_help_io(op, &path)(e);
            TransferError::Io { op, path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
