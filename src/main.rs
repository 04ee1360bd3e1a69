mod cli;
mod config;
mod converter;
mod docx_html;
mod docx_reader;
mod error;
mod folder;
mod index;
mod markdown;
mod odt_reader;
mod pdf_reader;
mod reader;
mod shell;
mod source;

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let config = config::Config::from_cli(&cli);
    match converter::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
