//! Export command implementation.

use super::open_store;
use crate::cli::ExportArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use citeline_domain::traits::RecordRepository;
use citeline_domain::FieldKey;
use citeline_review::{default_export_columns, export_file_name, export_to_csv, search, ExportColumn};
use std::fs;
use tracing::debug;

/// Execute the export command.
pub async fn execute_export(args: ExportArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;
    let records = store.list_records()?;

    let selected = search::filter(&records, args.search.as_deref().unwrap_or(""));
    let count = selected.len();
    let columns = select_columns(args.columns.as_deref());

    let csv = export_to_csv(selected, &columns);
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let file_name = export_file_name(args.prefix.as_deref().unwrap_or(""), &date);

    fs::create_dir_all(&args.output)?;
    let path = args.output.join(file_name);
    fs::write(&path, csv)?;
    debug!("Wrote {} bytes of CSV", fs::metadata(&path)?.len());

    println!(
        "{}",
        formatter.success(&format!("Exported {} record(s) to {}", count, path.display()))
    );
    Ok(())
}

/// Default columns, or only the requested ones in default order.
fn select_columns(requested: Option<&[FieldKey]>) -> Vec<ExportColumn> {
    let mut columns = default_export_columns();
    if let Some(keys) = requested {
        for column in &mut columns {
            column.enabled = keys.contains(&column.key);
        }
    }
    columns
}
