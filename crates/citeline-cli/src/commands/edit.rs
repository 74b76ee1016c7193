//! Edit and rename command implementations.

use super::{find_record, open_store};
use crate::cli::{EditArgs, RenameArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use citeline_review::{CellEditor, CompositeEditor};

/// Execute the edit command.
pub async fn execute_edit(args: EditArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = open_store(config)?;
    let record = find_record(&store, &args.record)?;

    let mut editor = CellEditor::new(record.id, args.field);
    editor.begin(true, &record)?;
    editor.set_draft(args.value)?;

    match editor.commit(&mut store, &record)? {
        Some(updated) => {
            let field = updated.field(args.field);
            println!(
                "{}",
                formatter.success(&format!(
                    "{} of {} set to \"{}\" ({} citation(s) kept)",
                    args.field.label(),
                    record.id.short(),
                    field.value,
                    field.citations().len()
                ))
            );
        }
        None => println!("{}", formatter.info("Value unchanged, nothing saved")),
    }
    Ok(())
}

/// Execute the rename command.
pub async fn execute_rename(args: RenameArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if args.name.is_none() && args.description.is_none() {
        return Err(CliError::InvalidInput(
            "Provide --name, --description or both".to_string(),
        ));
    }

    let mut store = open_store(config)?;
    let record = find_record(&store, &args.record)?;

    let mut editor = CompositeEditor::new(record.id);
    editor.begin(true, &record)?;
    if let Some(name) = args.name {
        editor.set_name(name)?;
    }
    if let Some(description) = args.description {
        editor.set_description(description)?;
    }

    match editor.commit(&mut store, &record)? {
        Some(updated) => println!(
            "{}",
            formatter.success(&format!(
                "Renamed {}: {} / {}",
                record.id.short(),
                updated.item_name.value,
                updated.product_description.value
            ))
        ),
        None => println!("{}", formatter.info("Name and description unchanged, nothing saved")),
    }
    Ok(())
}
