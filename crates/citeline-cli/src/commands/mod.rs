//! Command implementations.

pub mod backfill;
pub mod documents;
pub mod edit;
pub mod export;
pub mod init_config;
pub mod records;
pub mod upload;

pub use self::backfill::execute_backfill;
pub use self::documents::{execute_delete_document, execute_documents};
pub use self::edit::{execute_edit, execute_rename};
pub use self::export::execute_export;
pub use self::init_config::execute_init_config;
pub use self::records::{execute_delete, execute_list, execute_show};
pub use self::upload::execute_upload;

use crate::config::Config;
use crate::error::{CliError, Result};
use citeline_domain::traits::{DocumentRepository, RecordRepository};
use citeline_domain::{Document, DocumentId, Record, RecordId};
use citeline_store::SqliteStore;
use std::fs;

/// Open the configured database, creating its directory on first use.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(SqliteStore::new(&config.database_path)?)
}

/// Find a record by full id or by a unique id prefix.
pub fn find_record<R>(repo: &R, input: &str) -> Result<Record>
where
    R: RecordRepository,
    CliError: From<R::Error>,
{
    if let Ok(id) = RecordId::from_string(input) {
        return repo
            .get_record(id)?
            .ok_or_else(|| CliError::NotFound(format!("record {}", id)));
    }

    let prefix = prefix_of(input, "record")?;
    let matches: Vec<Record> = repo
        .list_records()?
        .into_iter()
        .filter(|r| r.id.to_string().starts_with(&prefix))
        .collect();
    unique(matches, input, "record")
}

/// Find a document by full id or by a unique id prefix.
pub fn find_document<R>(repo: &R, input: &str) -> Result<Document>
where
    R: DocumentRepository,
    CliError: From<R::Error>,
{
    if let Ok(id) = DocumentId::from_string(input) {
        return repo
            .get_document(id)?
            .ok_or_else(|| CliError::NotFound(format!("document {}", id)));
    }

    let prefix = prefix_of(input, "document")?;
    let matches: Vec<Document> = repo
        .list_documents()?
        .into_iter()
        .filter(|d| d.id.to_string().starts_with(&prefix))
        .collect();
    unique(matches, input, "document")
}

fn prefix_of(input: &str, kind: &str) -> Result<String> {
    let prefix = input.trim().to_lowercase();
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        return Err(CliError::InvalidInput(format!("Invalid {} id '{}'", kind, input)));
    }
    Ok(prefix)
}

fn unique<T>(mut matches: Vec<T>, input: &str, kind: &str) -> Result<T> {
    match matches.len() {
        0 => Err(CliError::NotFound(format!("{} {}", kind, input))),
        1 => Ok(matches.remove(0)),
        n => Err(CliError::InvalidInput(format!(
            "{} id prefix '{}' matches {} {}s",
            kind, input, n, kind
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeline_domain::{CitedField, DocumentDraft, DocumentType, FieldKey, RecordDraft};
    use citeline_store::StoreError;

    fn seeded() -> (SqliteStore, Document, Record) {
        let mut store = SqliteStore::in_memory().unwrap();
        let doc = store
            .create_document(DocumentDraft {
                filename: "public/po.pdf".to_string(),
                original_name: "po.pdf".to_string(),
                document_type: DocumentType::PurchaseOrder,
            })
            .unwrap();
        let record = store
            .create_record(
                RecordDraft::new(doc.id, DocumentType::PurchaseOrder)
                    .with_field(FieldKey::ItemName, CitedField::manual("Tile")),
            )
            .unwrap();
        (store, doc, record)
    }

    #[test]
    fn test_find_by_full_id_and_prefix() {
        let (store, doc, record) = seeded();
        assert_eq!(find_record(&store, &record.id.to_string()).unwrap().id, record.id);
        assert_eq!(find_record(&store, &record.id.short()).unwrap().id, record.id);
        assert_eq!(find_document(&store, &doc.id.short()).unwrap().id, doc.id);
    }

    #[test]
    fn test_find_missing_and_invalid() {
        let (store, _, _) = seeded();
        let missing = RecordId::new().to_string();
        assert!(matches!(find_record(&store, &missing), Err(CliError::NotFound(_))));
        assert!(matches!(find_record(&store, "not-an-id!"), Err(CliError::InvalidInput(_))));
        assert!(matches!(find_record(&store, ""), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_store_error_converts() {
        let err: CliError = StoreError::NotFound("record x".to_string()).into();
        assert!(err.to_string().contains("record x"));
    }
}
