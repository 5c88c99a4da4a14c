//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors for safety.

use anyhow::{Context, Result, anyhow};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{CONFIG_ENV, CONFIG_FILE_NAME, LOG_FILE_NAME};

const APP_DIR: &str = "vault_transfer";

/// Config file location.
///
/// `$VAULT_TRANSFER_CONFIG` wins: a relative value is resolved against the current
/// directory and a directory value gets `config.xml` appended. Otherwise the
/// OS config dir is used (`~/.config/vault_transfer/config.xml` on Linux).
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV) {
        let mut p = PathBuf::from(raw);
        if p.is_relative() {
            p = env::current_dir()
                .context("resolve current directory for relative config path")?
                .join(p);
        }
        if p.is_dir() {
            p.push(CONFIG_FILE_NAME);
        }
        return Ok(p);
    }
    let base = config_dir()
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or_else(|| anyhow!("cannot determine a config directory (no HOME)"))?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// Log file location: beside an explicit `$VAULT_TRANSFER_CONFIG`, else the OS data dir.
pub fn default_log_path() -> Result<PathBuf> {
    if env::var_os(CONFIG_ENV).is_some() {
        let cfg = default_config_path()?;
        let dir = cfg
            .parent()
            .ok_or_else(|| anyhow!("config path has no parent: {}", cfg.display()))?;
        return Ok(dir.join(LOG_FILE_NAME));
    }
    let base = data_dir()
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
        .ok_or_else(|| anyhow!("cannot determine a data directory (no HOME)"))?;
    Ok(base.join(APP_DIR).join(LOG_FILE_NAME))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
