//! Citeline CLI - extract, review and export cited product records.

use citeline_cli::commands;
use citeline_cli::config::OutputFormat;
use citeline_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> citeline_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (log to stderr, stdout carries command output)
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    // init-config must work even when the existing file does not parse
    if let Command::InitConfig(args) = cli.command {
        let format: OutputFormat = cli.format.map(Into::into).unwrap_or_default();
        let formatter = Formatter::new(format, !cli.no_color);
        return commands::execute_init_config(args, &config_path, &formatter).await;
    }

    let config = Config::load(&config_path)?;
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Upload(args) => commands::execute_upload(args, &config, &formatter).await?,
        Command::List(args) => commands::execute_list(args, &config, &formatter).await?,
        Command::Show(args) => commands::execute_show(args, &config, &formatter).await?,
        Command::Edit(args) => commands::execute_edit(args, &config, &formatter).await?,
        Command::Rename(args) => commands::execute_rename(args, &config, &formatter).await?,
        Command::Export(args) => commands::execute_export(args, &config, &formatter).await?,
        Command::Backfill(args) => commands::execute_backfill(args, &config, &formatter).await?,
        Command::Documents => commands::execute_documents(&config, &formatter).await?,
        Command::Delete(args) => commands::execute_delete(args, &config, &formatter).await?,
        Command::DeleteDocument(args) => {
            commands::execute_delete_document(args, &config, &formatter).await?
        }
        Command::InitConfig(_) => unreachable!("handled before loading the config"),
    }

    Ok(())
}
