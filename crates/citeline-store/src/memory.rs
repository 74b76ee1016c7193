//! In-memory repositories for tests and dry runs
//!
//! Same contract as [`crate::SqliteStore`]: insertion-ordered listing,
//! not-found errors on update and delete, status transitions checked,
//! and document deletion cascading to records.

use crate::StoreError;
use citeline_domain::traits::{
    DocumentRepository, RecordQuery, RecordRepository, ViewedRecordLog,
};
use citeline_domain::{
    Document, DocumentDraft, DocumentId, DocumentStatus, Record, RecordId, RecordPatch,
};

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Vec<Record>,
    documents: Vec<Document>,
    viewed: Vec<RecordId>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with records, for tests
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    fn record_index(&self, id: RecordId) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("record {}", id)))
    }

    fn document_index(&self, id: DocumentId) -> Result<usize, StoreError> {
        self.documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("document {}", id)))
    }

    fn forget_missing_views(&mut self) {
        let records = &self.records;
        self.viewed.retain(|id| records.iter().any(|r| r.id == *id));
    }
}

impl RecordRepository for MemoryStore {
    type Error = StoreError;

    fn list_records(&self) -> Result<Vec<Record>, Self::Error> {
        Ok(self.records.clone())
    }

    fn list_records_where(&self, query: &RecordQuery) -> Result<Vec<Record>, Self::Error> {
        Ok(self.records.iter().filter(|r| query.matches(r)).cloned().collect())
    }

    fn get_record(&self, id: RecordId) -> Result<Option<Record>, Self::Error> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn insert_records(&mut self, records: Vec<Record>) -> Result<(), Self::Error> {
        for record in &records {
            if self.records.iter().any(|r| r.id == record.id) {
                return Err(StoreError::Duplicate(record.id.to_string()));
            }
        }
        self.records.extend(records);
        Ok(())
    }

    fn update_record(&mut self, id: RecordId, patch: &RecordPatch) -> Result<Record, Self::Error> {
        let idx = self.record_index(id)?;
        self.records[idx].apply(patch);
        Ok(self.records[idx].clone())
    }

    fn delete_record(&mut self, id: RecordId) -> Result<(), Self::Error> {
        let idx = self.record_index(id)?;
        self.records.remove(idx);
        self.forget_missing_views();
        Ok(())
    }

    fn delete_records_where(&mut self, query: &RecordQuery) -> Result<usize, Self::Error> {
        let before = self.records.len();
        self.records.retain(|r| !query.matches(r));
        self.forget_missing_views();
        Ok(before - self.records.len())
    }
}

impl DocumentRepository for MemoryStore {
    type Error = StoreError;

    fn list_documents(&self) -> Result<Vec<Document>, Self::Error> {
        Ok(self.documents.clone())
    }

    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error> {
        Ok(self.documents.iter().find(|d| d.id == id).cloned())
    }

    fn create_document(&mut self, draft: DocumentDraft) -> Result<Document, Self::Error> {
        let document = Document::from_draft(draft);
        self.documents.push(document.clone());
        Ok(document)
    }

    fn update_document_status(
        &mut self,
        id: DocumentId,
        status: DocumentStatus,
        error: Option<String>,
    ) -> Result<Document, Self::Error> {
        let idx = self.document_index(id)?;
        let document = &mut self.documents[idx];
        if !document.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: document.status,
                to: status,
            });
        }
        document.status = status;
        document.error = error;
        Ok(document.clone())
    }

    fn delete_document(&mut self, id: DocumentId) -> Result<(), Self::Error> {
        let idx = self.document_index(id)?;
        self.documents.remove(idx);
        self.delete_records_where(&RecordQuery::for_document(id))?;
        Ok(())
    }
}

impl ViewedRecordLog for MemoryStore {
    type Error = StoreError;

    fn mark_viewed(&mut self, id: RecordId) -> Result<(), Self::Error> {
        self.record_index(id)?;
        if !self.viewed.contains(&id) {
            self.viewed.push(id);
        }
        Ok(())
    }

    fn viewed_record_ids(&self) -> Result<Vec<RecordId>, Self::Error> {
        Ok(self.viewed.clone())
    }
}
