//! Init-config command implementation.

use crate::cli::InitConfigArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the init-config command.
pub async fn execute_init_config(args: InitConfigArgs, path: &Path, formatter: &Formatter) -> Result<()> {
    if path.exists() && !args.force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }

    Config::default().save(path)?;
    println!(
        "{}",
        formatter.success(&format!("Wrote default configuration to {}", path.display()))
    );
    Ok(())
}
