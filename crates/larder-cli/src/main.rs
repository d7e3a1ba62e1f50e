mod app;
mod args;
mod commands;
mod render;
mod ui;

use anyhow::Result;
use clap::Parser;

use args::{Cli, Command};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    larder_core::verbose::init_from_env();
    if cli.verbose {
        larder_core::set_verbose(true);
    }

    match cli.command {
        None => commands::interactive::run().await,
        Some(Command::Generate(args)) => commands::generate::run(args).await,
        Some(Command::Library { action }) => commands::library::run(action),
        Some(Command::Shop { action }) => commands::shop::run(action),
        Some(Command::Cook(args)) => commands::cook::run(args).await,
        Some(Command::Setup) => commands::setup::run(),
        Some(Command::Config(args)) => commands::config::run(args),
        Some(Command::Devices) => commands::devices::run(),
    }
}
