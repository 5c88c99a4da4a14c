//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Creates a secure template if missing (unless VAULT_TRANSFER_CONFIG is set).
//!
//! Notes:
//! - This module only reads/writes the config file; semantic checks live in `validate`.
//! - Unknown XML fields are a hard error to surface misconfigurations early.

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{DateFallback, DateSource, DateVariable, LogLevel, OverrideRule, TransferConfig};
use super::CONFIG_ENV;
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    output_vault: Option<String>,
    output_folder: Option<String>,
    recreate_tree: Option<bool>,
    automatic_create_output_folder: Option<bool>,
    overwrite: Option<bool>,
    create_link: Option<bool>,
    delete_original: Option<bool>,
    move_to_system_trash: Option<bool>,
    date_variable: Option<XmlDateVariable>,
    remove_path: Option<XmlRemovePath>,
    override_path: Option<XmlOverridePath>,
    config_dir: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlDateVariable {
    source: Option<String>,
    key: Option<String>,
    fallback: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlRemovePath {
    #[serde(rename = "rule", default)]
    rules: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlOverridePath {
    #[serde(rename = "rule", default)]
    rules: Vec<XmlOverrideRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlOverrideRule {
    source: String,
    #[serde(default)]
    replacement: String,
}

/// Outcome of looking for the config file at startup.
#[derive(Debug)]
pub enum LoadResult {
    /// The file existed and parsed.
    Loaded { path: PathBuf, config: Box<TransferConfig> },
    /// No file existed at the default location; a template was written there.
    CreatedTemplate(PathBuf),
    /// `VAULT_TRANSFER_CONFIG` names a file that does not exist; defaults apply.
    Missing(PathBuf),
}

fn trimmed(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn date_variable_from_xml(x: XmlDateVariable) -> Result<DateVariable> {
    let source = match trimmed(x.source.as_deref()) {
        Some(s) => s.parse::<DateSource>().map_err(|e| anyhow!(e))?,
        None => DateSource::Now,
    };
    let fallback = trimmed(x.fallback.as_deref())
        .map(|s| s.parse::<DateFallback>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let frontmatter_key = trimmed(x.key.as_deref()).map(str::to_string);
    if source == DateSource::Frontmatter && frontmatter_key.is_none() {
        bail!("date_variable source 'frontmatter' requires a <key>");
    }
    Ok(DateVariable {
        source,
        frontmatter_key,
        fallback,
    })
}

// Map XmlConfig -> TransferConfig; unset fields keep their defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<TransferConfig> {
    let mut cfg = TransferConfig::default();

    if let Some(v) = trimmed(parsed.output_vault.as_deref()) {
        cfg.output_vault = PathBuf::from(v);
    }
    if let Some(f) = parsed.output_folder.as_deref() {
        cfg.output_folder = f.trim().to_string();
    }
    if let Some(s) = trimmed(parsed.log_file.as_deref()) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    if let Some(s) = trimmed(parsed.log_level.as_deref())
        && let Ok(level) = s.parse::<LogLevel>()
    {
        cfg.log_level = level;
    }
    if let Some(d) = trimmed(parsed.config_dir.as_deref()) {
        cfg.config_dir = d.to_string();
    }

    cfg.recreate_tree = parsed.recreate_tree.unwrap_or(cfg.recreate_tree);
    cfg.automatic_create_output_folder = parsed
        .automatic_create_output_folder
        .unwrap_or(cfg.automatic_create_output_folder);
    cfg.overwrite = parsed.overwrite.unwrap_or(cfg.overwrite);
    cfg.create_link = parsed.create_link.unwrap_or(cfg.create_link);
    cfg.delete_original = parsed.delete_original.unwrap_or(cfg.delete_original);
    cfg.move_to_system_trash = parsed.move_to_system_trash.unwrap_or(cfg.move_to_system_trash);

    if let Some(dv) = parsed.date_variable {
        cfg.date_variable = date_variable_from_xml(dv).context("invalid <date_variable>")?;
    }
    if let Some(rp) = parsed.remove_path {
        cfg.remove_path = rp.rules.into_iter().filter(|r| !r.is_empty()).collect();
    }
    if let Some(op) = parsed.override_path {
        cfg.override_path = op
            .rules
            .into_iter()
            .map(|r| OverrideRule {
                source: r.source,
                replacement: r.replacement,
            })
            .collect();
    }
    Ok(cfg)
}

/// Load a TransferConfig from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<TransferConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("config xml '{}'", path.display()))
}

/// Locate and load the config file, writing a template on first run.
pub fn load_or_init() -> Result<LoadResult> {
    let env_set = env::var_os(CONFIG_ENV).is_some();
    let path = default_config_path().context("resolve config path")?;

    if !path.exists() {
        if env_set {
            debug!(path = %path.display(), "Config named by environment does not exist; using defaults");
            return Ok(LoadResult::Missing(path));
        }
        create_template_config(&path)?;
        return Ok(LoadResult::CreatedTemplate(path));
    }

    let config = load_config_from_xml_path(&path)?;
    debug!(path = %path.display(), "Loaded config");
    Ok(LoadResult::Loaded {
        path,
        config: Box::new(config),
    })
}

/// Create the default template config file and its parent directory.
/// Uses secure creation to avoid following attacker-controlled symlinks on Unix.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
        let _ = set_dir_mode_0700(parent);
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/vault_transfer.log".into());

    let content = format!(
        r#"<!--
  vault_transfer configuration (XML)

  Destination:
    output_vault                    -> absolute path of the destination vault (required)
    output_folder                   -> folder inside it; may contain {{{{YYYY}}}}-style date tokens

  Boolean flags (true/false):
    recreate_tree                   -> mirror the source folder structure
    automatic_create_output_folder  -> create the output folder when missing
    overwrite                       -> replace existing destination files
    create_link                     -> replace the source note with a link to the copy
    delete_original                 -> trash the source after copying (ignored with create_link)
    move_to_system_trash            -> use the OS trash instead of the vault's .trash

  Date used by templates:
    <date_variable><source>now | frontmatter | creation | modification</source>
                   <key>frontmatter field</key><fallback>creation | modification</fallback></date_variable>

  Rules (applied in order, only when recreate_tree is set):
    <remove_path><rule>regex</rule></remove_path>
    <override_path><rule><source>text or /regex/flags</source><replacement>text</replacement></rule></override_path>

  Other fields:
    config_dir                      -> host settings folder hidden from the destination list
    log_level                       -> quiet | normal | info | debug
    log_file                        -> path to log file (optional)

  CLI flags override XML values.
-->
<config>
  <output_vault></output_vault>
  <output_folder></output_folder>
  <recreate_tree>false</recreate_tree>
  <automatic_create_output_folder>false</automatic_create_output_folder>
  <overwrite>false</overwrite>
  <create_link>true</create_link>
  <delete_original>false</delete_original>
  <move_to_system_trash>false</move_to_system_trash>
  <date_variable>
    <source>now</source>
  </date_variable>
  <remove_path></remove_path>
  <override_path></override_path>
  <log_level>normal</log_level>
  <log_file>{suggested_log}</log_file>
</config>
"#
    );

    // Atomic, secure write (O_NOFOLLOW + create_new on Unix), then tighten perms.
    write_config_secure_new_0600(path, content.as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!(path = %path.display(), "Created template config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(xml: &str) -> Result<TransferConfig> {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, xml).unwrap();
        load_config_from_xml_path(&p)
    }

    #[test]
    fn nested_rules_and_date_variable() {
        let cfg = parse(
            r#"<config>
  <output_vault>/B</output_vault>
  <output_folder>Imported/{{YYYY}}</output_folder>
  <recreate_tree>true</recreate_tree>
  <date_variable><source>frontmatter</source><key>created</key><fallback>modification</fallback></date_variable>
  <remove_path><rule>^Notes/</rule><rule>Drafts/</rule></remove_path>
  <override_path>
    <rule><source>/^Archive\//</source><replacement>{{YYYY}}/</replacement></rule>
    <rule><source>Inbox</source><replacement>Sorted</replacement></rule>
  </override_path>
</config>"#,
        )
        .unwrap();
        assert_eq!(cfg.output_vault, PathBuf::from("/B"));
        assert_eq!(cfg.output_folder, "Imported/{{YYYY}}");
        assert!(cfg.recreate_tree);
        assert!(cfg.create_link, "unset flags keep defaults");
        assert_eq!(cfg.date_variable.source, DateSource::Frontmatter);
        assert_eq!(cfg.date_variable.frontmatter_key.as_deref(), Some("created"));
        assert_eq!(cfg.date_variable.fallback, Some(DateFallback::Modification));
        assert_eq!(cfg.remove_path, vec!["^Notes/".to_string(), "Drafts/".to_string()]);
        assert_eq!(cfg.override_path.len(), 2);
        assert_eq!(cfg.override_path[0].source, r"/^Archive\//");
        assert_eq!(cfg.override_path[1].replacement, "Sorted");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse("<config><output_vault>/B</output_vault><bogus>1</bogus></config>").unwrap_err();
        assert!(format!("{err:#}").contains("parse config xml"));
    }

    #[test]
    fn frontmatter_source_needs_key() {
        let err = parse("<config><date_variable><source>frontmatter</source></date_variable></config>")
            .unwrap_err();
        assert!(format!("{err:#}").contains("requires a <key>"));
    }

    #[test]
    fn template_round_trips_through_loader() {
        let td = tempdir().unwrap();
        let p = td.path().join("nested").join("config.xml");
        create_template_config(&p).unwrap();
        let cfg = load_config_from_xml_path(&p).unwrap();
        assert!(!cfg.has_output_vault());
        assert!(cfg.create_link);
        assert!(cfg.remove_path.is_empty());
        assert!(cfg.override_path.is_empty());
    }
}
