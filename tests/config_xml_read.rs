//! Verify XML config is parsed into TransferConfig without touching user state.

use std::fs;
use tempfile::tempdir;

use vault_transfer::{DateFallback, DateSource, LogLevel, OverrideRule, load_config_from_xml_path};

#[test]
fn reads_every_field() {
    let td = tempdir().expect("create tempdir");
    let cfg_path = td.path().join("config.xml");
    let out_vault = td.path().join("WorkVault");
    let log_file = td.path().join("vault_transfer.log");

    let xml = format!(
        r#"
<config>
  <output_vault>  {}  </output_vault>
  <output_folder>Imported/{{{{YYYY}}}}</output_folder>
  <recreate_tree>true</recreate_tree>
  <automatic_create_output_folder>true</automatic_create_output_folder>
  <overwrite>true</overwrite>
  <create_link>false</create_link>
  <delete_original>true</delete_original>
  <move_to_system_trash>true</move_to_system_trash>
  <date_variable>
    <source>frontmatter</source>
    <key>created</key>
    <fallback>modification</fallback>
  </date_variable>
  <remove_path>
    <rule>^Notes/</rule>
    <rule>\s+draft</rule>
  </remove_path>
  <override_path>
    <rule><source>/^Archive\//</source><replacement>{{{{YYYY}}}}/</replacement></rule>
    <rule><source>Inbox</source><replacement>Triage</replacement></rule>
  </override_path>
  <config_dir>.settings</config_dir>
  <log_level>debug</log_level>
  <log_file>{}</log_file>
</config>
"#,
        out_vault.display(),
        log_file.display()
    );
    fs::write(&cfg_path, xml).expect("write config.xml");

    let cfg = load_config_from_xml_path(&cfg_path).expect("load_config_from_xml_path");

    assert_eq!(cfg.output_vault, out_vault, "output_vault is trimmed");
    assert_eq!(cfg.output_folder, "Imported/{{YYYY}}");
    assert!(cfg.recreate_tree && cfg.automatic_create_output_folder && cfg.overwrite);
    assert!(!cfg.create_link);
    assert!(cfg.delete_original && cfg.move_to_system_trash);
    assert_eq!(cfg.date_variable.source, DateSource::Frontmatter);
    assert_eq!(cfg.date_variable.frontmatter_key.as_deref(), Some("created"));
    assert_eq!(cfg.date_variable.fallback, Some(DateFallback::Modification));
    assert_eq!(cfg.remove_path, vec!["^Notes/".to_string(), r"\s+draft".to_string()]);
    assert_eq!(
        cfg.override_path,
        vec![
            OverrideRule { source: r"/^Archive\//".into(), replacement: "{{YYYY}}/".into() },
            OverrideRule { source: "Inbox".into(), replacement: "Triage".into() },
        ]
    );
    assert_eq!(cfg.config_dir, ".settings");
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.log_file.as_deref(), Some(log_file.as_path()));
    cfg.validate().expect("rules compile");
}

#[test]
fn missing_fields_keep_defaults() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config><output_vault>/vaults/out</output_vault></config>").unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert!(cfg.create_link);
    assert!(!cfg.overwrite && !cfg.recreate_tree && !cfg.delete_original);
    assert_eq!(cfg.output_folder, "");
    assert_eq!(cfg.date_variable.source, DateSource::Now);
    assert!(cfg.remove_path.is_empty() && cfg.override_path.is_empty());
    assert_eq!(cfg.config_dir, ".obsidian");
    assert_eq!(cfg.log_level, LogLevel::Normal);
}

#[test]
fn malformed_and_unknown_are_errors() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");

    fs::write(&cfg_path, "<config><output_vault>/x</output_vault>").unwrap();
    assert!(load_config_from_xml_path(&cfg_path).is_err());

    fs::write(&cfg_path, "<config><download_base>/x</download_base></config>").unwrap();
    assert!(load_config_from_xml_path(&cfg_path).is_err());

    fs::write(
        &cfg_path,
        "<config><date_variable><source>frontmatter</source></date_variable></config>",
    )
    .unwrap();
    let err = load_config_from_xml_path(&cfg_path).unwrap_err();
    assert!(format!("{err:#}").contains("requires a <key>"), "{err:#}");
}

#[test]
fn invalid_rule_is_reported_by_validate() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(
        &cfg_path,
        "<config><output_vault>/vaults/out</output_vault><remove_path><rule>([</rule></remove_path></config>",
    )
    .unwrap();
    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    let err = cfg.validate().unwrap_err();
    assert_eq!(err.kind(), "invalid_rule");
    assert!(err.is_policy());
}
