//! Document listing and deletion.

use super::{find_document, open_store};
use crate::cli::DeleteDocumentArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use citeline_domain::traits::{DocumentRepository, RecordQuery, RecordRepository};
use std::io::{self, Write};

/// Execute the documents command.
pub async fn execute_documents(config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;
    let documents = store.list_documents()?;
    println!("{}", formatter.format_documents(&documents)?);
    Ok(())
}

/// Execute the delete-document command.
pub async fn execute_delete_document(
    args: DeleteDocumentArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let mut store = open_store(config)?;
    let doc = find_document(&store, &args.document)?;
    let record_count = store
        .list_records_where(&RecordQuery::for_document(doc.id))?
        .len();

    // Confirm deletion unless --yes is specified
    if !args.yes {
        println!(
            "About to delete document {} ({}) and {} record(s).",
            doc.id.short(),
            doc.original_name,
            record_count
        );
        print!("Continue? [y/N] ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    store.delete_document(doc.id)?;
    println!(
        "{}",
        formatter.success(&format!(
            "Deleted document {} and {} record(s)",
            doc.original_name, record_count
        ))
    );
    Ok(())
}
