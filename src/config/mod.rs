//! Configuration: types, default paths, XML loading and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{DateFallback, DateSource, DateVariable, LogLevel, OverrideRule, TransferConfig};
pub use validate::ensure_distinct_vaults;
pub use xml::{LoadResult, create_template_config, load_config_from_xml_path, load_or_init};

/// Environment variable naming an explicit config file (or directory).
pub const CONFIG_ENV: &str = "VAULT_TRANSFER_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.xml";
pub const LOG_FILE_NAME: &str = "vault_transfer.log";
/// The host application's per-vault settings folder.
pub const DEFAULT_CONFIG_DIR: &str = ".obsidian";
