//! Application orchestrator.
//! Loads and merges config, initializes logging, opens the source vault and
//! dispatches the requested command.

use anyhow::{Context, Result, anyhow, bail};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

use vault_transfer::cli::{Args, Command};
use vault_transfer::config::{CONFIG_ENV, LoadResult, load_or_init};
use vault_transfer::output as out;
use vault_transfer::picker::{CREATE_NEW_FOLDER, find_candidate};
use vault_transfer::progress::ConsoleSurface;
use vault_transfer::{
    ConsoleNotices, Entry, FsVault, TextBuffer, TransferConfig, TransferContext, TransferOptions, TransferOutcome,
    TransferStatus, VaultIndex, create_destination_folder, default_config_path, destination_candidates,
    ensure_distinct_vaults, insert_link_to_other_vault, reference_date, transfer_folder, transfer_note,
};

use crate::logging::init_tracing;

fn print_config_location() {
    if let Some(cfg_env) = std::env::var_os(CONFIG_ENV) {
        out::print_info(&format!(
            "Using {CONFIG_ENV} (explicit):\n  {}\n",
            PathBuf::from(cfg_env).display()
        ));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default vault-transfer config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run any command to create a template.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a default config path: {e}")),
    }
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    if args.print_config {
        print_config_location();
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = args.command.clone() else {
        bail!("no command given; see --help");
    };

    let mut cfg = match load_or_init()? {
        LoadResult::Loaded { config, .. } => *config,
        LoadResult::CreatedTemplate(path) => {
            out::print_success(&format!("A template vault-transfer config was written to: {}", path.display()));
            out::print_info("Set <output_vault> (and optionally <output_folder>, <log_level>, <log_file>), then re-run this command.");
            out::print_info(&format!("To use a different location set {CONFIG_ENV}."));
            return Ok(ExitCode::SUCCESS);
        }
        LoadResult::Missing(path) => {
            out::print_warn(&format!(
                "{CONFIG_ENV} points to '{}', which does not exist; using defaults and flags.",
                path.display()
            ));
            TransferConfig::default()
        }
    };
    args.apply_overrides(&mut cfg);

    let guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).inspect_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
    })?;
    debug!(?args, "Starting vault-transfer");

    let result = dispatch(&args, &command, &cfg);
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "Command failed");
    }
    drop(guard);
    result
}

fn dispatch(args: &Args, command: &Command, cfg: &TransferConfig) -> Result<ExitCode> {
    cfg.validate().context("invalid configuration")?;

    if *command == Command::Destinations {
        for candidate in destination_candidates(cfg)? {
            match candidate.output_path() {
                Some(p) => out::print_user(&format!("{}\t{}", candidate.label, p.display())),
                None => out::print_user(&candidate.label),
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let root = match &args.vault {
        Some(v) => v.clone(),
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let vault = FsVault::open(&root)
        .with_context(|| format!("open source vault '{}'", root.display()))?
        .with_config_dir(cfg.config_dir.clone());
    ensure_distinct_vaults(vault.root(), &cfg.output_vault)?;

    let target = command.target().unwrap_or_default();
    let entry = vault
        .entry_at(&target)
        .ok_or_else(|| anyhow!("'{target}' is not a note or folder in {}", vault.root().display()))?;

    let notices = ConsoleNotices;
    let surface = ConsoleSurface;
    let ctx = TransferContext {
        vault: &vault,
        config: cfg,
        notices: &notices,
        surface: &surface,
    };

    match command {
        Command::Transfer { .. } => Ok(report(&run_entry(&ctx, entry, None))),
        Command::TransferTo { to, new_folder, .. } => {
            let destination = match (to, new_folder) {
                (_, Some(name)) => create_destination_folder(cfg, name)?,
                (Some(label), None) => {
                    let candidates = destination_candidates(cfg)?;
                    let candidate = find_candidate(&candidates, label)
                        .ok_or_else(|| anyhow!("no destination named '{label}'; run `destinations` to list them"))?;
                    candidate
                        .output_path()
                        .map(PathBuf::from)
                        .ok_or_else(|| anyhow!("'{CREATE_NEW_FOLDER}' needs --new-folder <NAME>"))?
                }
                (None, None) => bail!("transfer-to needs --to or --new-folder"),
            };
            Ok(report(&run_entry(&ctx, entry, Some(destination))))
        }
        Command::Link { .. } => {
            let Entry::Note(note) = entry else {
                bail!("'{target}' is a folder; links are made for notes");
            };
            let mut buffer = TextBuffer::new("");
            let link = insert_link_to_other_vault(cfg, &notices, Some(&note), &mut buffer)?;
            out::print_user(&link);
            Ok(ExitCode::SUCCESS)
        }
        Command::Destinations => Ok(ExitCode::SUCCESS),
    }
}

fn run_entry(ctx: &TransferContext<'_>, entry: Entry, explicit: Option<PathBuf>) -> Vec<TransferOutcome> {
    match entry {
        Entry::Note(note) => {
            let options = TransferOptions {
                recursive: false,
                explicit_output_path: explicit,
                reference_date: reference_date(ctx.vault, Some(&note), ctx.config),
            };
            vec![transfer_note(ctx, &note, None, &options)]
        }
        Entry::Folder(folder) => transfer_folder(ctx, &folder, explicit).outcomes,
    }
}

/// Print one line per copied note; exit 1 unless everything was copied.
fn report(outcomes: &[TransferOutcome]) -> ExitCode {
    for outcome in outcomes {
        if let (TransferStatus::Copied, Some(dest)) = (&outcome.status, &outcome.destination) {
            out::print_success(&format!("{} -> {}", outcome.source, dest.display()));
        }
    }
    let copied = outcomes.iter().filter(|o| o.is_copied()).count();
    info!(copied, total = outcomes.len(), "Transfer finished");
    if !outcomes.is_empty() && copied == outcomes.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
