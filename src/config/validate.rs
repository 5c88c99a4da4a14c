//! Config validation logic.
//! Runs before any filesystem access: the destination vault must be set and every rule must compile.

use std::fs;
use std::path::Path;
use tracing::{debug, error};

use crate::errors::{Result, TransferError};
use crate::rewrite::{compile_override, compile_removal};

use super::types::TransferConfig;

impl TransferConfig {
    /// Check the settings a transfer depends on. Touches nothing on disk.
    pub fn validate(&self) -> Result<()> {
        if !self.has_output_vault() {
            error!(kind = "config", "Output vault is not set");
            return Err(TransferError::Config(
                "Output vault is not set; configure output_vault before transferring".into(),
            ));
        }

        for rule in &self.remove_path {
            compile_removal(rule).map_err(|source| TransferError::InvalidRule {
                rule: rule.clone(),
                source,
            })?;
        }
        for rule in &self.override_path {
            if let Some(Err(source)) = compile_override(&rule.source) {
                return Err(TransferError::InvalidRule {
                    rule: rule.source.clone(),
                    source,
                });
            }
        }

        debug!(
            output_vault = %self.output_vault.display(),
            output_folder = %self.output_folder,
            "Config validated"
        );
        Ok(())
    }
}

/// Refuse to transfer a vault into itself (or into one of its own folders).
pub fn ensure_distinct_vaults(source_vault: &Path, output_vault: &Path) -> Result<()> {
    let src_real = fs::canonicalize(source_vault)
        .map(|p| dunce::simplified(&p).to_path_buf())
        .unwrap_or_else(|_| source_vault.to_path_buf());
    let out_real = fs::canonicalize(output_vault)
        .map(|p| dunce::simplified(&p).to_path_buf())
        .unwrap_or_else(|_| output_vault.to_path_buf());

    if src_real == out_real {
        return Err(TransferError::Config(format!(
            "source and output vault resolve to the same path: '{}'",
            src_real.display()
        )));
    }
    if out_real.starts_with(&src_real) {
        return Err(TransferError::Config(format!(
            "output vault '{}' must not be inside the source vault '{}'",
            out_real.display(),
            src_real.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverrideRule;
    use tempfile::tempdir;

    #[test]
    fn unset_vault_is_config_error() {
        let err = TransferConfig::new("", "Imported").validate().unwrap_err();
        assert_eq!(err.kind(), "config");
        assert!(err.is_policy());
    }

    #[test]
    fn invalid_rules_are_reported() {
        let mut cfg = TransferConfig::new("/B", "Imported");
        cfg.remove_path = vec!["([".into()];
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind(), "invalid_rule");
        assert!(err.is_policy());

        let mut cfg = TransferConfig::new("/B", "Imported");
        cfg.override_path = vec![OverrideRule {
            source: "/([/".into(),
            replacement: String::new(),
        }];
        assert!(cfg.validate().unwrap_err().to_string().starts_with("Invalid rule '/([/'"));

        let mut cfg = TransferConfig::new("/B", "Imported");
        cfg.override_path = vec![OverrideRule {
            source: "([ but literal".into(),
            replacement: String::new(),
        }];
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn nested_output_vault_rejected() {
        let td = tempdir().unwrap();
        let src = td.path().join("A");
        let nested = src.join("Inner");
        fs::create_dir_all(&nested).unwrap();
        let other = td.path().join("B");
        fs::create_dir_all(&other).unwrap();

        assert!(ensure_distinct_vaults(&src, &src).is_err());
        assert!(ensure_distinct_vaults(&src, &nested).is_err());
        assert!(ensure_distinct_vaults(&src, &other).is_ok());
    }
}
