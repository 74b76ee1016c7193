//! Per-cell edit protocol
//!
//! ```text
//! Viewing --begin (row selected)--> Editing --confirm--> Saving --> Viewing
//!                                      |        (unchanged: no write)
//!                                      +--cancel--> Viewing
//! ```
//!
//! Committing writes the trimmed draft together with the field's existing
//! citations. Citations record where a claim came from, so an edited
//! value still points at its original source.

use crate::EditError;
use citeline_domain::traits::RecordRepository;
use citeline_domain::{FieldKey, Record, RecordId, RecordPatch};
use tracing::{debug, warn};

/// State of one editable cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    /// Showing the committed value
    #[default]
    Viewing,
    /// Holding a local draft
    Editing {
        /// Uncommitted text
        draft: String,
    },
    /// Write in flight
    Saving {
        /// Value being written
        value: String,
    },
}

/// Editor for a single field of a single record
#[derive(Debug, Clone)]
pub struct CellEditor {
    record_id: RecordId,
    key: FieldKey,
    state: EditState,
}

impl CellEditor {
    /// Editor for `key` on `record_id`, starting in `Viewing`
    pub fn new(record_id: RecordId, key: FieldKey) -> Self {
        Self {
            record_id,
            key,
            state: EditState::Viewing,
        }
    }

    /// Current state
    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// Field being edited
    pub fn key(&self) -> FieldKey {
        self.key
    }

    /// Whether a draft is open
    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    /// Enter `Editing` with the committed value as the draft
    ///
    /// Refused unless the cell's row is the selected row. Calling it while
    /// already editing keeps the current draft.
    pub fn begin(&mut self, row_selected: bool, record: &Record) -> Result<(), EditError> {
        if !row_selected {
            return Err(EditError::NotSelected);
        }
        self.check_record(record)?;
        if !self.is_editing() {
            self.state = EditState::Editing {
                draft: record.field(self.key).value.clone(),
            };
        }
        Ok(())
    }

    /// Replace the draft text
    pub fn set_draft(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        match &mut self.state {
            EditState::Editing { draft } => {
                *draft = text.into();
                Ok(())
            }
            _ => Err(EditError::NotEditing),
        }
    }

    /// Discard the draft without writing
    pub fn cancel(&mut self) {
        self.state = EditState::Viewing;
    }

    /// Close the draft and work out what to write
    ///
    /// Returns `None` (and goes back to `Viewing`) when the trimmed draft
    /// equals the committed value. Otherwise moves to `Saving` and returns
    /// the patch to write, carrying the field's current citations.
    pub fn confirm(&mut self, record: &Record) -> Result<Option<RecordPatch>, EditError> {
        self.check_record(record)?;
        let EditState::Editing { draft } = &self.state else {
            return Err(EditError::NotEditing);
        };

        let value = draft.trim().to_string();
        let current = record.field(self.key);
        if value == current.value {
            self.state = EditState::Viewing;
            return Ok(None);
        }

        let patch = RecordPatch::single(self.key, current.with_value(value.clone()));
        self.state = EditState::Saving { value };
        Ok(Some(patch))
    }

    /// The write finished
    pub fn saved(&mut self) {
        self.state = EditState::Viewing;
    }

    /// The write failed; the unsaved value becomes the draft again
    pub fn save_failed(&mut self) {
        if let EditState::Saving { value } = &self.state {
            self.state = EditState::Editing {
                draft: value.clone(),
            };
        }
    }

    /// Confirm and write through `repo`
    ///
    /// Returns the updated record, or `None` when nothing changed.
    pub fn commit<R: RecordRepository>(
        &mut self,
        repo: &mut R,
        record: &Record,
    ) -> Result<Option<Record>, EditError> {
        let Some(patch) = self.confirm(record)? else {
            debug!("Edit of {} on {} unchanged, not saving", self.key, self.record_id.short());
            return Ok(None);
        };

        match repo.update_record(self.record_id, &patch) {
            Ok(updated) => {
                self.saved();
                debug!("Saved {} on {}", self.key, self.record_id.short());
                Ok(Some(updated))
            }
            Err(e) => {
                self.save_failed();
                warn!("Saving {} on {} failed: {}", self.key, self.record_id, e);
                Err(EditError::Repository(e.to_string()))
            }
        }
    }

    fn check_record(&self, record: &Record) -> Result<(), EditError> {
        if record.id != self.record_id {
            return Err(EditError::RecordMismatch {
                expected: self.record_id,
                found: record.id,
            });
        }
        Ok(())
    }
}

/// Name and description edited as one unit
///
/// Both drafts are buffered until the whole composite is confirmed, then
/// written as two independent field updates.
#[derive(Debug, Clone)]
pub struct CompositeEditor {
    name: CellEditor,
    description: CellEditor,
}

impl CompositeEditor {
    /// Editor for the name and description of `record_id`
    pub fn new(record_id: RecordId) -> Self {
        Self {
            name: CellEditor::new(record_id, FieldKey::ItemName),
            description: CellEditor::new(record_id, FieldKey::ProductDescription),
        }
    }

    /// Open both drafts
    pub fn begin(&mut self, row_selected: bool, record: &Record) -> Result<(), EditError> {
        self.name.begin(row_selected, record)?;
        if let Err(e) = self.description.begin(row_selected, record) {
            self.name.cancel();
            return Err(e);
        }
        Ok(())
    }

    /// Whether either half still holds an unsaved draft
    pub fn is_editing(&self) -> bool {
        self.name.is_editing() || self.description.is_editing()
    }

    /// Replace the name draft
    pub fn set_name(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        self.name.set_draft(text)
    }

    /// Replace the description draft
    pub fn set_description(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        self.description.set_draft(text)
    }

    /// Discard both drafts
    pub fn cancel(&mut self) {
        self.name.cancel();
        self.description.cancel();
    }

    /// Confirm the composite and write whichever halves changed
    ///
    /// Returns the record after the last write, or `None` when neither
    /// half changed. If the name write fails the description is not
    /// attempted. A half that was already saved is skipped, so calling
    /// this again after a failure writes only what is still open.
    pub fn commit<R: RecordRepository>(
        &mut self,
        repo: &mut R,
        record: &Record,
    ) -> Result<Option<Record>, EditError> {
        if !self.is_editing() {
            return Err(EditError::NotEditing);
        }

        let mut after_name = None;
        if self.name.is_editing() {
            after_name = self.name.commit(repo, record)?;
        }
        // Each half carries only its own field, so the stale `record` is
        // still a valid base for the description patch.
        let mut after_description = None;
        if self.description.is_editing() {
            after_description = self.description.commit(repo, record)?;
        }
        Ok(after_description.or(after_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeline_domain::traits::DocumentRepository;
    use citeline_domain::{
        BlockType, BoundingBox, Citation, CitedField, Confidence, DocumentDraft, DocumentType,
        RecordDraft,
    };
    use citeline_domain::traits::RecordQuery;
    use citeline_store::{MemoryStore, StoreError};

    /// Store whose description writes fail while `reject_description` is set
    struct FlakyStore {
        inner: MemoryStore,
        reject_description: bool,
    }

    impl RecordRepository for FlakyStore {
        type Error = StoreError;

        fn list_records(&self) -> Result<Vec<Record>, StoreError> {
            self.inner.list_records()
        }

        fn list_records_where(&self, query: &RecordQuery) -> Result<Vec<Record>, StoreError> {
            self.inner.list_records_where(query)
        }

        fn get_record(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
            self.inner.get_record(id)
        }

        fn insert_records(&mut self, records: Vec<Record>) -> Result<(), StoreError> {
            self.inner.insert_records(records)
        }

        fn update_record(&mut self, id: RecordId, patch: &RecordPatch) -> Result<Record, StoreError> {
            if self.reject_description && patch.get(FieldKey::ProductDescription).is_some() {
                return Err(StoreError::InvalidData("description write rejected".to_string()));
            }
            self.inner.update_record(id, patch)
        }

        fn delete_record(&mut self, id: RecordId) -> Result<(), StoreError> {
            self.inner.delete_record(id)
        }

        fn delete_records_where(&mut self, query: &RecordQuery) -> Result<usize, StoreError> {
            self.inner.delete_records_where(query)
        }
    }

    fn cited(value: &str, page: u32) -> CitedField {
        CitedField::new(
            value,
            vec![Citation::new(
                BlockType::Table,
                value,
                BoundingBox::new(0.2, 0.3, 0.1, 0.02, page),
                Confidence::Medium,
            )],
        )
    }

    fn seeded() -> (MemoryStore, Record) {
        let mut store = MemoryStore::new();
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
                    .with_field(FieldKey::ItemName, cited("Desk", 2))
                    .with_field(FieldKey::ProductDescription, cited("Oak top", 2))
                    .with_field(FieldKey::Finish, cited("Natural", 3)),
            )
            .unwrap();
        (store, record)
    }

    #[test]
    fn test_cannot_edit_unselected_row() {
        let (_, record) = seeded();
        let mut editor = CellEditor::new(record.id, FieldKey::Finish);
        assert_eq!(editor.begin(false, &record), Err(EditError::NotSelected));
        assert_eq!(editor.state(), &EditState::Viewing);
    }

    #[test]
    fn test_commit_keeps_citations() {
        let (mut store, record) = seeded();
        let mut editor = CellEditor::new(record.id, FieldKey::Finish);
        editor.begin(true, &record).unwrap();
        editor.set_draft("  Walnut ").unwrap();

        let updated = editor.commit(&mut store, &record).unwrap().unwrap();
        assert_eq!(updated.finish.value, "Walnut");
        assert_eq!(updated.finish.citations, record.finish.citations);
        assert_eq!(updated.item_name, record.item_name);
        assert_eq!(editor.state(), &EditState::Viewing);
    }

    #[test]
    fn test_unchanged_draft_does_not_write() {
        let (mut store, record) = seeded();
        let mut editor = CellEditor::new(record.id, FieldKey::Finish);
        editor.begin(true, &record).unwrap();
        editor.set_draft("Natural  ").unwrap();

        assert_eq!(editor.commit(&mut store, &record).unwrap(), None);
        assert_eq!(store.get_record(record.id).unwrap().unwrap(), record);
    }

    #[test]
    fn test_cancel_discards_draft() {
        let (mut store, record) = seeded();
        let mut editor = CellEditor::new(record.id, FieldKey::Finish);
        editor.begin(true, &record).unwrap();
        editor.set_draft("Walnut").unwrap();
        editor.cancel();

        assert_eq!(editor.commit(&mut store, &record), Err(EditError::NotEditing));
        assert_eq!(store.get_record(record.id).unwrap().unwrap().finish.value, "Natural");
    }

    #[test]
    fn test_failed_save_reopens_draft() {
        let (mut store, record) = seeded();
        store.delete_record(record.id).unwrap();

        let mut editor = CellEditor::new(record.id, FieldKey::Finish);
        editor.begin(true, &record).unwrap();
        editor.set_draft("Walnut").unwrap();

        let result = editor.commit(&mut store, &record);
        assert!(matches!(result, Err(EditError::Repository(_))));
        assert_eq!(
            editor.state(),
            &EditState::Editing {
                draft: "Walnut".to_string()
            }
        );
    }

    #[test]
    fn test_editor_rejects_other_record() {
        let (_, record) = seeded();
        let mut editor = CellEditor::new(RecordId::new(), FieldKey::Finish);
        assert!(matches!(
            editor.begin(true, &record),
            Err(EditError::RecordMismatch { .. })
        ));
    }

    #[test]
    fn test_composite_writes_both_fields_on_confirm() {
        let (mut store, record) = seeded();
        let mut editor = CompositeEditor::new(record.id);
        editor.begin(true, &record).unwrap();
        editor.set_name("Standing Desk").unwrap();
        editor.set_description("Oak top, steel base").unwrap();

        // Nothing is written before the composite is confirmed
        assert_eq!(store.get_record(record.id).unwrap().unwrap(), record);

        let updated = editor.commit(&mut store, &record).unwrap().unwrap();
        assert_eq!(updated.item_name.value, "Standing Desk");
        assert_eq!(updated.product_description.value, "Oak top, steel base");
        assert_eq!(updated.item_name.citations, record.item_name.citations);
        assert_eq!(
            updated.product_description.citations,
            record.product_description.citations
        );
    }

    #[test]
    fn test_composite_only_name_changed() {
        let (mut store, record) = seeded();
        let mut editor = CompositeEditor::new(record.id);
        editor.begin(true, &record).unwrap();
        editor.set_name("Standing Desk").unwrap();

        let updated = editor.commit(&mut store, &record).unwrap().unwrap();
        assert_eq!(updated.item_name.value, "Standing Desk");
        assert_eq!(updated.product_description, record.product_description);
    }

    #[test]
    fn test_composite_retry_after_description_failure() {
        let (inner, record) = seeded();
        let mut store = FlakyStore {
            inner,
            reject_description: true,
        };
        let mut editor = CompositeEditor::new(record.id);
        editor.begin(true, &record).unwrap();
        editor.set_name("Standing Desk").unwrap();
        editor.set_description("Oak top, steel base").unwrap();

        let result = editor.commit(&mut store, &record);
        assert!(matches!(result, Err(EditError::Repository(_))));
        assert!(editor.is_editing());
        let stored = store.get_record(record.id).unwrap().unwrap();
        assert_eq!(stored.item_name.value, "Standing Desk");
        assert_eq!(stored.product_description, record.product_description);

        // The description draft survived and can still be changed
        editor.set_description("Oak top, black steel base").unwrap();
        assert_eq!(editor.set_name("Desk"), Err(EditError::NotEditing));

        store.reject_description = false;
        let updated = editor.commit(&mut store, &record).unwrap().unwrap();
        assert_eq!(updated.item_name.value, "Standing Desk");
        assert_eq!(updated.product_description.value, "Oak top, black steel base");
        assert_eq!(
            updated.product_description.citations,
            record.product_description.citations
        );
        assert!(!editor.is_editing());
        assert_eq!(editor.commit(&mut store, &record), Err(EditError::NotEditing));
    }
}
