use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    // Values already in the environment win over `.env`.
    dotenvy::dotenv().ok();
    shelfsync::logging::init().context("init logging")?;

    let cli = shelfsync::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        shelfsync::cli::Command::Scrape(args) => {
            shelfsync::scrape::run(args).context("scrape")?;
        }
        shelfsync::cli::Command::Sync(args) => {
            shelfsync::sync::run(args).context("sync")?;
        }
    }

    Ok(())
}
