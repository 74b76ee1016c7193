//! SQLite-backed repositories

use crate::StoreError;
use citeline_domain::traits::{
    DocumentRepository, RecordQuery, RecordRepository, ViewedRecordLog,
};
use citeline_domain::{
    CitedField, Document, DocumentDraft, DocumentId, DocumentStatus, DocumentType, FieldKey,
    Record, RecordDraft, RecordId, RecordPatch,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

const RECORD_COLUMNS: &str = "id, document_id, document_type, created_at, fields";
const DOCUMENT_COLUMNS: &str =
    "id, filename, original_name, upload_date, status, document_type, error";

/// SQLite-based implementation of the record and document repositories
///
/// Listing returns rows in insertion order. Deleting a document cascades
/// to its records through a foreign key.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share one store behind a mutex
/// or give each thread its own.
pub struct SqliteStore {
    conn: Connection,
}

struct RecordRow {
    id: Vec<u8>,
    document_id: Vec<u8>,
    document_type: String,
    created_at: i64,
    fields: String,
}

struct DocumentRow {
    id: Vec<u8>,
    filename: String,
    original_name: String,
    upload_date: i64,
    status: String,
    document_type: String,
    error: Option<String>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// In-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn id_to_bytes(value: u128) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }

    fn bytes_to_u128(bytes: &[u8]) -> Result<u128, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!("Expected 16 bytes for id, got {}", bytes.len()))
        })?;
        Ok(u128::from_be_bytes(arr))
    }

    fn parse_document_type(s: &str) -> Result<DocumentType, StoreError> {
        DocumentType::parse(s)
            .ok_or_else(|| StoreError::InvalidData(format!("Unknown document type: {}", s)))
    }

    fn encode_fields(record: &Record) -> Result<String, StoreError> {
        let mut map = Map::new();
        for (key, field) in record.fields() {
            map.insert(key.as_str().to_string(), serde_json::to_value(field)?);
        }
        Ok(Value::Object(map).to_string())
    }

    fn decode_fields(json: &str) -> Result<Vec<(FieldKey, CitedField)>, StoreError> {
        let value: Value = serde_json::from_str(json)?;
        let obj = value
            .as_object()
            .ok_or_else(|| StoreError::InvalidData("fields column is not an object".to_string()))?;

        let mut fields = Vec::with_capacity(FieldKey::ALL.len());
        for key in FieldKey::ALL {
            if let Some(field) = obj.get(key.as_str()) {
                fields.push((key, serde_json::from_value(field.clone())?));
            }
        }
        Ok(fields)
    }

    fn record_from_row(row: RecordRow) -> Result<Record, StoreError> {
        let draft = RecordDraft {
            document_id: DocumentId::from_value(Self::bytes_to_u128(&row.document_id)?),
            document_type: Self::parse_document_type(&row.document_type)?,
            fields: Self::decode_fields(&row.fields)?,
        };
        Ok(Record::restore(
            RecordId::from_value(Self::bytes_to_u128(&row.id)?),
            row.created_at as u64,
            draft,
        ))
    }

    fn document_from_row(row: DocumentRow) -> Result<Document, StoreError> {
        Ok(Document {
            id: DocumentId::from_value(Self::bytes_to_u128(&row.id)?),
            filename: row.filename,
            original_name: row.original_name,
            upload_date: row.upload_date as u64,
            status: DocumentStatus::parse(&row.status)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown status: {}", row.status)))?,
            document_type: Self::parse_document_type(&row.document_type)?,
            error: row.error,
        })
    }

    fn read_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
        Ok(RecordRow {
            id: row.get(0)?,
            document_id: row.get(1)?,
            document_type: row.get(2)?,
            created_at: row.get(3)?,
            fields: row.get(4)?,
        })
    }

    fn read_document_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRow> {
        Ok(DocumentRow {
            id: row.get(0)?,
            filename: row.get(1)?,
            original_name: row.get(2)?,
            upload_date: row.get(3)?,
            status: row.get(4)?,
            document_type: row.get(5)?,
            error: row.get(6)?,
        })
    }

    fn record_exists(&self, id: RecordId) -> Result<bool, StoreError> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM records WHERE id = ?1",
                params![Self::id_to_bytes(id.value())],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }
}

impl RecordRepository for SqliteStore {
    type Error = StoreError;

    fn list_records(&self) -> Result<Vec<Record>, Self::Error> {
        self.list_records_where(&RecordQuery::default())
    }

    fn list_records_where(&self, query: &RecordQuery) -> Result<Vec<Record>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM records
             WHERE (?1 IS NULL OR document_id = ?1)
               AND (?2 IS NULL OR document_type = ?2)
             ORDER BY seq",
            RECORD_COLUMNS
        ))?;

        let rows = stmt
            .query_map(
                params![
                    query.document_id.map(|id| Self::id_to_bytes(id.value())),
                    query.document_type.map(|ty| ty.as_str()),
                ],
                Self::read_record_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::record_from_row).collect()
    }

    fn get_record(&self, id: RecordId) -> Result<Option<Record>, Self::Error> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS),
                params![Self::id_to_bytes(id.value())],
                Self::read_record_row,
            )
            .optional()?;
        row.map(Self::record_from_row).transpose()
    }

    fn insert_records(&mut self, records: Vec<Record>) -> Result<(), Self::Error> {
        let mut encoded = Vec::with_capacity(records.len());
        for record in &records {
            encoded.push(Self::encode_fields(record)?);
        }

        let tx = self.conn.transaction()?;
        for (record, fields) in records.iter().zip(encoded) {
            let result = tx.execute(
                "INSERT INTO records (id, document_id, document_type, created_at, fields)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    Self::id_to_bytes(record.id.value()),
                    Self::id_to_bytes(record.document_id.value()),
                    record.document_type.as_str(),
                    record.created_at as i64,
                    fields,
                ],
            );
            if let Err(rusqlite::Error::SqliteFailure(err, _)) = &result {
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                    return Err(StoreError::Duplicate(record.id.to_string()));
                }
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                    return Err(StoreError::NotFound(format!(
                        "document {}",
                        record.document_id
                    )));
                }
            }
            result?;
        }
        tx.commit()?;
        debug!("Inserted {} records", records.len());
        Ok(())
    }

    fn update_record(&mut self, id: RecordId, patch: &RecordPatch) -> Result<Record, Self::Error> {
        let mut record = self
            .get_record(id)?
            .ok_or_else(|| StoreError::NotFound(format!("record {}", id)))?;
        record.apply(patch);

        self.conn.execute(
            "UPDATE records SET fields = ?1 WHERE id = ?2",
            params![Self::encode_fields(&record)?, Self::id_to_bytes(id.value())],
        )?;
        Ok(record)
    }

    fn delete_record(&mut self, id: RecordId) -> Result<(), Self::Error> {
        let deleted = self.conn.execute(
            "DELETE FROM records WHERE id = ?1",
            params![Self::id_to_bytes(id.value())],
        )?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("record {}", id)));
        }
        Ok(())
    }

    fn delete_records_where(&mut self, query: &RecordQuery) -> Result<usize, Self::Error> {
        let deleted = self.conn.execute(
            "DELETE FROM records
             WHERE (?1 IS NULL OR document_id = ?1)
               AND (?2 IS NULL OR document_type = ?2)",
            params![
                query.document_id.map(|id| Self::id_to_bytes(id.value())),
                query.document_type.map(|ty| ty.as_str()),
            ],
        )?;
        Ok(deleted)
    }
}

impl DocumentRepository for SqliteStore {
    type Error = StoreError;

    fn list_documents(&self) -> Result<Vec<Document>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM documents ORDER BY seq", DOCUMENT_COLUMNS))?;
        let rows = stmt
            .query_map([], Self::read_document_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(Self::document_from_row).collect()
    }

    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS),
                params![Self::id_to_bytes(id.value())],
                Self::read_document_row,
            )
            .optional()?;
        row.map(Self::document_from_row).transpose()
    }

    fn create_document(&mut self, draft: DocumentDraft) -> Result<Document, Self::Error> {
        let document = Document::from_draft(draft);
        self.conn.execute(
            "INSERT INTO documents (id, filename, original_name, upload_date, status, document_type, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Self::id_to_bytes(document.id.value()),
                &document.filename,
                &document.original_name,
                document.upload_date as i64,
                document.status.as_str(),
                document.document_type.as_str(),
                &document.error,
            ],
        )?;
        Ok(document)
    }

    fn update_document_status(
        &mut self,
        id: DocumentId,
        status: DocumentStatus,
        error: Option<String>,
    ) -> Result<Document, Self::Error> {
        let mut document = self
            .get_document(id)?
            .ok_or_else(|| StoreError::NotFound(format!("document {}", id)))?;

        if !document.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: document.status,
                to: status,
            });
        }

        self.conn.execute(
            "UPDATE documents SET status = ?1, error = ?2 WHERE id = ?3",
            params![status.as_str(), &error, Self::id_to_bytes(id.value())],
        )?;
        document.status = status;
        document.error = error;
        Ok(document)
    }

    fn delete_document(&mut self, id: DocumentId) -> Result<(), Self::Error> {
        let deleted = self.conn.execute(
            "DELETE FROM documents WHERE id = ?1",
            params![Self::id_to_bytes(id.value())],
        )?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("document {}", id)));
        }
        Ok(())
    }
}

impl ViewedRecordLog for SqliteStore {
    type Error = StoreError;

    fn mark_viewed(&mut self, id: RecordId) -> Result<(), Self::Error> {
        if !self.record_exists(id)? {
            return Err(StoreError::NotFound(format!("record {}", id)));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO viewed_records (record_id, viewed_at) VALUES (?1, ?2)",
            params![
                Self::id_to_bytes(id.value()),
                citeline_domain::current_timestamp() as i64
            ],
        )?;
        Ok(())
    }

    fn viewed_record_ids(&self) -> Result<Vec<RecordId>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT record_id FROM viewed_records ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, Vec<u8>>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.iter()
            .map(|bytes| Self::bytes_to_u128(bytes).map(RecordId::from_value))
            .collect()
    }
}
