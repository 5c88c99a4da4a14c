use anyhow::Result;
use std::process::ExitCode;

mod app;
mod logging;

fn main() -> Result<ExitCode> {
    let args = vault_transfer::cli::parse();
    app::run(args)
}
