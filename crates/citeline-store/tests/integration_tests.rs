//! Integration tests for citeline-store
//!
//! These tests verify the full CRUD cycle for records and documents
//! against both repository implementations.

use citeline_domain::traits::{
    DocumentRepository, ObjectStorage, RecordQuery, RecordRepository, SourceFile,
    ViewedRecordLog,
};
use citeline_domain::{
    BlockType, BoundingBox, Citation, CitedField, Confidence, DocumentDraft, DocumentId,
    DocumentStatus, DocumentType, FieldKey, RecordDraft, RecordPatch,
};
use citeline_store::{FsStorage, MemoryStore, SqliteStore, StoreError, STORAGE_PREFIX};

fn cited(value: &str, page: u32) -> CitedField {
    CitedField::new(
        value,
        vec![Citation::new(
            BlockType::Table,
            value,
            BoundingBox::new(0.1, 0.2, 0.3, 0.05, page),
            Confidence::High,
        )],
    )
}

fn draft(name: &str) -> DocumentDraft {
    DocumentDraft {
        filename: format!("{}/{}", STORAGE_PREFIX, name),
        original_name: name.to_string(),
        document_type: DocumentType::PurchaseOrder,
    }
}

fn chair(document_id: DocumentId) -> RecordDraft {
    RecordDraft::new(document_id, DocumentType::PurchaseOrder)
        .with_field(FieldKey::ItemName, cited("Task Chair", 1))
        .with_field(FieldKey::Manufacturer, cited("Steelcase", 1))
        .with_field(FieldKey::SpecIdNumber, cited("CH-1", 2))
}

/// Shared contract checks, run against every store
fn check_record_crud<S>(store: &mut S)
where
    S: RecordRepository<Error = StoreError> + DocumentRepository<Error = StoreError>,
{
    let doc = store.create_document(draft("po.pdf")).unwrap();
    assert_eq!(doc.status, DocumentStatus::Processing);

    let record = store.create_record(chair(doc.id)).unwrap();
    let loaded = store.get_record(record.id).unwrap().expect("record stored");
    assert_eq!(loaded, record);
    assert_eq!(loaded.spec_id_number.primary_citation().unwrap().page(), 2);

    // Patching one field leaves the rest untouched
    let patch = RecordPatch::single(FieldKey::Finish, CitedField::manual("Black"));
    let updated = store.update_record(record.id, &patch).unwrap();
    assert_eq!(updated.finish.value, "Black");
    assert_eq!(updated.item_name, record.item_name);
    assert_eq!(store.get_record(record.id).unwrap().unwrap(), updated);

    // Value-only edits keep citations
    let renamed = store
        .update_field_value(record.id, FieldKey::ItemName, "Task Chair, Armless")
        .unwrap();
    assert_eq!(renamed.item_name.value, "Task Chair, Armless");
    assert_eq!(renamed.item_name.citations, record.item_name.citations);

    store.delete_record(record.id).unwrap();
    assert!(store.get_record(record.id).unwrap().is_none());
    assert!(matches!(
        store.update_field_value(record.id, FieldKey::ItemName, "Gone"),
        Err(StoreError::NotFound(_))
    ));
    assert!(store.delete_record(record.id).unwrap_err().to_string().contains("Not found"));
}

fn check_document_lifecycle<S>(store: &mut S)
where
    S: RecordRepository<Error = StoreError>
        + DocumentRepository<Error = StoreError>
        + ViewedRecordLog<Error = StoreError>,
{
    let first = store.create_document(draft("a.pdf")).unwrap();
    let second = store.create_document(draft("b.pdf")).unwrap();
    let a1 = store.create_record(chair(first.id)).unwrap();
    let a2 = store.create_record(chair(first.id)).unwrap();
    let b1 = store.create_record(chair(second.id)).unwrap();
    store.mark_viewed(a1.id).unwrap();
    store.mark_viewed(b1.id).unwrap();

    let listed: Vec<_> = store.list_records().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(listed, vec![a1.id, a2.id, b1.id]);
    assert_eq!(
        store
            .list_records_where(&RecordQuery::for_document(first.id))
            .unwrap()
            .len(),
        2
    );

    let failed = store
        .update_document_status(first.id, DocumentStatus::Error, Some("timeout".to_string()))
        .unwrap();
    assert_eq!(failed.error.as_deref(), Some("timeout"));
    assert!(matches!(
        store.update_document_status(first.id, DocumentStatus::Completed, None),
        Err(StoreError::InvalidTransition { .. })
    ));

    store.delete_document(first.id).unwrap();
    let remaining: Vec<_> = store.list_records().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(remaining, vec![b1.id]);
    assert_eq!(store.viewed_record_ids().unwrap(), vec![b1.id]);
    assert_eq!(store.list_documents().unwrap().len(), 1);
}

#[test]
fn test_sqlite_record_crud() {
    let mut store = SqliteStore::in_memory().unwrap();
    check_record_crud(&mut store);
}

#[test]
fn test_memory_record_crud() {
    let mut store = MemoryStore::new();
    check_record_crud(&mut store);
}

#[test]
fn test_sqlite_document_lifecycle() {
    let mut store = SqliteStore::in_memory().unwrap();
    check_document_lifecycle(&mut store);
}

#[test]
fn test_memory_document_lifecycle() {
    let mut store = MemoryStore::new();
    check_document_lifecycle(&mut store);
}

#[test]
fn test_sqlite_rejects_orphan_records() {
    let mut store = SqliteStore::in_memory().unwrap();
    let result = store.create_record(chair(DocumentId::new()));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_delete_records_where_counts() {
    let mut store = SqliteStore::in_memory().unwrap();
    let doc = store.create_document(draft("a.pdf")).unwrap();
    for _ in 0..3 {
        store.create_record(chair(doc.id)).unwrap();
    }
    let removed = store
        .delete_records_where(&RecordQuery::for_document(doc.id))
        .unwrap();
    assert_eq!(removed, 3);
    assert!(store.list_records().unwrap().is_empty());
}

#[test]
fn test_sqlite_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("citeline.db");

    let record_id = {
        let mut store = SqliteStore::new(&path).unwrap();
        let doc = store.create_document(draft("a.pdf")).unwrap();
        store
            .update_document_status(doc.id, DocumentStatus::Completed, None)
            .unwrap();
        store.create_record(chair(doc.id)).unwrap().id
    };

    let store = SqliteStore::new(&path).unwrap();
    let record = store.get_record(record_id).unwrap().expect("record persisted");
    assert_eq!(record.item_name.value, "Task Chair");
    assert_eq!(record.item_name.citations.len(), 1);
    assert_eq!(
        store.list_documents().unwrap()[0].status,
        DocumentStatus::Completed
    );
}

#[tokio::test]
async fn test_fs_storage_writes_under_public() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FsStorage::new(dir.path());

    let file = SourceFile::new("Order 12.pdf", b"%PDF-1.7".to_vec());
    let first = storage.store(&file).await.unwrap();
    let second = storage.store(&file).await.unwrap();

    assert!(first.starts_with("public/order-12-"));
    assert!(first.ends_with(".pdf"));
    assert_ne!(first, second);

    let written = std::fs::read(storage.resolve(&first)).unwrap();
    assert_eq!(written, b"%PDF-1.7");
    assert!(storage.url_for(&first).starts_with("file://"));
}
