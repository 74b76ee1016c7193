//! Backfill command implementation.

use super::open_store;
use crate::cli::BackfillArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use citeline_backend::OpenAiClassifier;
use citeline_backfill::Backfiller;

/// Execute the backfill command.
pub async fn execute_backfill(args: BackfillArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let settings = &config.classification;
    let classifier = OpenAiClassifier::from_env(
        settings.endpoint.as_str(),
        settings.model.as_str(),
        &settings.api_key_env,
    )?;
    let backfiller = Backfiller::new(classifier, config.backfill_config(args.dry_run)?);

    let mut store = open_store(config)?;
    let run = backfiller.backfill_and_persist(&mut store).await?;

    match formatter.format() {
        OutputFormat::Json => {
            let filled: Vec<serde_json::Value> = run
                .filled
                .iter()
                .map(|(id, code)| serde_json::json!({ "id": id.to_string(), "specIdNumber": code }))
                .collect();
            let value = serde_json::json!({
                "dryRun": args.dry_run,
                "examined": run.metrics.examined,
                "classified": run.metrics.classified,
                "failed": run.metrics.failed,
                "persisted": run.metrics.persisted,
                "filled": filled,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Quiet => {
            for (id, _) in &run.filled {
                println!("{}", id);
            }
        }
        OutputFormat::Table => {
            if args.dry_run {
                println!("{}", formatter.info("Dry run: no codes were saved"));
            }
            for (id, code) in &run.filled {
                println!("  {} → {}", id.short(), code);
            }
            println!("{}", run.metrics.summary());
            if run.metrics.has_failures() {
                println!(
                    "{}",
                    formatter.warning(&format!(
                        "{} classification call(s) failed; rerun to retry them",
                        run.metrics.failed
                    ))
                );
            }
        }
    }
    Ok(())
}
