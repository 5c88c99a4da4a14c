//! Core configuration types.
//! - TransferConfig holds every setting a transfer reads, with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.
//! - DateVariable selects where the reference date for path templates comes from.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{DEFAULT_CONFIG_DIR, paths};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Primary source of the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSource {
    /// No metadata date; templates expand against the current instant.
    #[default]
    Now,
    /// A frontmatter field, named by `DateVariable::frontmatter_key`.
    Frontmatter,
    Creation,
    Modification,
}

/// Timestamp used when the frontmatter field is absent or unparsable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFallback {
    Creation,
    Modification,
}

impl FromStr for DateSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "now" | "none" => Ok(DateSource::Now),
            "frontmatter" => Ok(DateSource::Frontmatter),
            "creation" | "ctime" => Ok(DateSource::Creation),
            "modification" | "mtime" => Ok(DateSource::Modification),
            other => Err(format!("invalid date source: '{other}'")),
        }
    }
}

impl FromStr for DateFallback {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creation" | "ctime" => Ok(DateFallback::Creation),
            "modification" | "mtime" => Ok(DateFallback::Modification),
            other => Err(format!("invalid date fallback: '{other}'")),
        }
    }
}

/// Where the reference date for `{{token}}` expansion comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateVariable {
    pub source: DateSource,
    pub frontmatter_key: Option<String>,
    pub fallback: Option<DateFallback>,
}

/// One ordered override: `source` is plain text or `/regex/flags`,
/// `replacement` may contain `{{date}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRule {
    pub source: String,
    pub replacement: String,
}

/// Runtime configuration used by every transfer.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Absolute path of the destination vault
    pub output_vault: PathBuf,
    /// Folder inside the destination vault; may contain date placeholders
    pub output_folder: String,
    /// Mirror the source folder structure under the output folder
    pub recreate_tree: bool,
    /// Create the output folder when it is missing
    pub automatic_create_output_folder: bool,
    /// Replace an existing destination file
    pub overwrite: bool,
    /// Replace the source note with a link to its new location
    pub create_link: bool,
    /// Trash the source after copying (ignored when create_link is set)
    pub delete_original: bool,
    /// Use the OS trash instead of the vault's `.trash` folder
    pub move_to_system_trash: bool,
    pub date_variable: DateVariable,
    /// Regex fragments deleted from the note path, in order
    pub remove_path: Vec<String>,
    /// Ordered override rules
    pub override_path: Vec<OverrideRule>,
    /// Host configuration directory hidden from the destination picker
    pub config_dir: String,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            output_vault: PathBuf::new(),
            output_folder: String::new(),
            recreate_tree: false,
            automatic_create_output_folder: false,
            overwrite: false,
            create_link: true,
            delete_original: false,
            move_to_system_trash: false,
            date_variable: DateVariable::default(),
            remove_path: Vec::new(),
            override_path: Vec::new(),
            config_dir: DEFAULT_CONFIG_DIR.to_string(),
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path().ok(),
        }
    }
}

impl TransferConfig {
    /// Construct a config with an explicit destination; other fields use defaults.
    pub fn new(output_vault: impl Into<PathBuf>, output_folder: impl Into<String>) -> Self {
        Self {
            output_vault: output_vault.into(),
            output_folder: output_folder.into(),
            ..Default::default()
        }
    }

    /// True when a destination vault has been configured.
    pub fn has_output_vault(&self) -> bool {
        !self.output_vault.to_string_lossy().trim().is_empty()
    }
}
