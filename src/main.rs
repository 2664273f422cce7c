// ABOUTME: Entry point for the buildnotify settings tool.
// ABOUTME: Opens the per-user settings store and runs a single settings command.

mod cli;
mod commands;

use buildnotify_config::{APPLICATION, Config, FileStore, ORGANIZATION};
use clap::Parser;

use cli::CliArgs;

type DynError = Box<dyn std::error::Error + Send + Sync>;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    if let Err(e) = run(args) {
        tracing::error!("Fatal: {e}");
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<(), DynError> {
    let store = match &args.settings {
        Some(path) => FileStore::open(path),
        None => FileStore::open_default(ORGANIZATION, APPLICATION),
    };
    tracing::debug!("Using settings at {}", store.path().display());

    let mut config = Config::new(store);
    let stdout = std::io::stdout();
    commands::execute(args.cmd, &mut config, &mut stdout.lock())
}
