//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Global flags override values loaded from the XML config.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::{LogLevel, TransferConfig};

/// Copy notes and folders into another vault, leaving a link behind.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Copy notes between Markdown vaults", arg_required_else_help = true)]
pub struct Args {
    /// Root of the source vault (defaults to the current directory).
    #[arg(long, global = true, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub vault: Option<PathBuf>,

    #[arg(long, global = true, value_name = "DIR", value_hint = ValueHint::DirPath, help = "Override the output vault")]
    pub output_vault: Option<PathBuf>,

    /// Folder template inside the output vault; `{{YYYY}}`-style date tokens are expanded.
    #[arg(long, global = true, value_name = "TEMPLATE")]
    pub output_folder: Option<String>,

    #[arg(long, global = true, help = "Recreate the source folder tree under the output folder")]
    pub recreate_tree: bool,

    #[arg(long, global = true, help = "Replace files that already exist at the destination")]
    pub overwrite: bool,

    #[arg(long, global = true, help = "Do not replace the source note with a link")]
    pub no_link: bool,

    #[arg(long, global = true, help = "Trash the source after copying (only without a link)")]
    pub delete_original: bool,

    #[arg(long, global = true, help = "Use the system trash instead of the vault's .trash")]
    pub system_trash: bool,

    #[arg(long, global = true, help = "Create the output folder when it is missing")]
    pub auto_create: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true)]
    pub json: bool,

    #[arg(long, help = "Print the config file location used by vault-transfer and exit")]
    pub print_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Transfer a note or folder (vault-relative) to the configured destination.
    Transfer {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Transfer a note or folder into a folder picked from `destinations`.
    TransferTo {
        #[arg(value_name = "PATH")]
        path: String,
        /// Label of a destination candidate.
        #[arg(long, value_name = "LABEL", conflicts_with = "new_folder", required_unless_present = "new_folder")]
        to: Option<String>,
        /// Create this folder under the output vault and transfer into it.
        #[arg(long, value_name = "NAME")]
        new_folder: Option<String>,
    },
    /// List destination candidates in the output vault.
    Destinations,
    /// Print the link a transfer of NOTE would leave behind.
    Link {
        #[arg(value_name = "NOTE")]
        note: String,
    },
}

impl Command {
    /// Vault-relative path the command operates on, with shell quoting residue removed.
    pub fn target(&self) -> Option<String> {
        match self {
            Command::Transfer { path } | Command::TransferTo { path, .. } => Some(sanitize_vault_path(path)),
            Command::Link { note } => Some(sanitize_vault_path(note)),
            Command::Destinations => None,
        }
    }
}

/// Trim surrounding quotes (PowerShell and CMD keep them), leading `./` and
/// one trailing separator.
pub fn sanitize_vault_path(s: &str) -> String {
    let trimmed = s.trim();
    let mut inner = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.trim_matches(|c| c == '\'' || c == '"').to_string()
    };
    inner = inner.replace('\\', "/");
    while let Some(rest) = inner.strip_prefix("./") {
        inner = rest.to_string();
    }
    if inner.len() > 1 && inner.ends_with('/') {
        inner.pop();
    }
    inner
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut TransferConfig) {
        if let Some(v) = &self.output_vault {
            cfg.output_vault = v.clone();
        }
        if let Some(f) = &self.output_folder {
            cfg.output_folder = f.trim().to_string();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        cfg.recreate_tree |= self.recreate_tree;
        cfg.overwrite |= self.overwrite;
        cfg.delete_original |= self.delete_original;
        cfg.move_to_system_trash |= self.system_trash;
        cfg.automatic_create_output_folder |= self.auto_create;
        if self.no_link {
            cfg.create_link = false;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
