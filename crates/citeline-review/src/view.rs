//! Selection state of the review table
//!
//! The selected record is stored by id only and looked up in the live
//! list on every read. A refresh, an edit or a search that hides the
//! record therefore can never leave the detail view showing stale
//! citations.

use crate::search;
use citeline_domain::{FieldKey, Record, RecordId};

/// Record with `id` in `records`, if any
pub fn resolve(records: &[Record], id: Option<RecordId>) -> Option<&Record> {
    let id = id?;
    records.iter().find(|r| r.id == id)
}

/// Ephemeral view state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Selected record, by id
    pub selected_record: Option<RecordId>,
    /// Selected field; item name unless the user picked another
    pub selected_field: FieldKey,
    /// Quick search text
    pub query: String,
}

/// "n of total" position of the selection within the visible records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based index
    pub index: usize,
    /// Visible record count
    pub total: usize,
    /// Record before the selection
    pub prev: Option<RecordId>,
    /// Record after the selection
    pub next: Option<RecordId>,
}

impl ViewState {
    /// Select a record
    pub fn select(&mut self, id: RecordId) {
        self.selected_record = Some(id);
    }

    /// Select a field of the current record
    pub fn select_field(&mut self, key: FieldKey) {
        self.selected_field = key;
    }

    /// Close the detail view
    pub fn clear_selection(&mut self) {
        self.selected_record = None;
    }

    /// Change the search text
    ///
    /// The selection id is kept; [`ViewState::selected`] simply stops
    /// resolving while the record is filtered out.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Records passing the current search, in list order
    pub fn visible<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        search::filter(records, &self.query)
    }

    /// Selected record, resolved within the visible set
    ///
    /// `None` when nothing is selected, the record is gone, or the search
    /// hides it.
    pub fn selected<'a>(&self, records: &'a [Record]) -> Option<&'a Record> {
        resolve(records, self.selected_record).filter(|r| search::matches(r, &self.query))
    }

    /// Position of the selection among the visible records
    pub fn position(&self, records: &[Record]) -> Option<Position> {
        let id = self.selected(records)?.id;
        let visible = self.visible(records);
        let idx = visible.iter().position(|r| r.id == id)?;
        Some(Position {
            index: idx + 1,
            total: visible.len(),
            prev: idx.checked_sub(1).map(|i| visible[i].id),
            next: visible.get(idx + 1).map(|r| r.id),
        })
    }

    /// Move the selection to the next visible record
    ///
    /// Returns the newly selected id; stays put at the end of the list.
    pub fn select_next(&mut self, records: &[Record]) -> Option<RecordId> {
        let next = self.position(records)?.next?;
        self.select(next);
        Some(next)
    }

    /// Move the selection to the previous visible record
    pub fn select_prev(&mut self, records: &[Record]) -> Option<RecordId> {
        let prev = self.position(records)?.prev?;
        self.select(prev);
        Some(prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeline_domain::{CitedField, DocumentId, DocumentType, RecordDraft};

    fn named(name: &str) -> Record {
        Record::from_draft(
            RecordDraft::new(DocumentId::new(), DocumentType::PurchaseOrder)
                .with_field(FieldKey::ItemName, CitedField::manual(name)),
        )
    }

    #[test]
    fn test_default_field_is_item_name() {
        assert_eq!(ViewState::default().selected_field, FieldKey::ItemName);
    }

    #[test]
    fn test_resolve_reads_live_list() {
        let mut records = vec![named("Desk")];
        let id = records[0].id;
        assert_eq!(resolve(&records, Some(id)).unwrap().item_name.value, "Desk");

        // A refreshed list with an edited value is what gets shown
        records[0].set_field(FieldKey::ItemName, CitedField::manual("Standing Desk"));
        assert_eq!(
            resolve(&records, Some(id)).unwrap().item_name.value,
            "Standing Desk"
        );

        records.clear();
        assert!(resolve(&records, Some(id)).is_none());
        assert!(resolve(&records, None).is_none());
    }

    #[test]
    fn test_filtered_out_selection_does_not_resolve() {
        let records = vec![named("Desk"), named("Chair")];
        let mut view = ViewState::default();
        view.select(records[0].id);
        assert!(view.selected(&records).is_some());

        view.set_query("chair");
        assert!(view.selected(&records).is_none());
        assert!(view.position(&records).is_none());

        // Clearing the search brings it back
        view.set_query("");
        assert_eq!(view.selected(&records).unwrap().id, records[0].id);
    }

    #[test]
    fn test_position_and_navigation() {
        let records = vec![named("A"), named("B"), named("C")];
        let mut view = ViewState::default();
        view.select(records[1].id);

        let position = view.position(&records).unwrap();
        assert_eq!((position.index, position.total), (2, 3));
        assert_eq!(position.prev, Some(records[0].id));
        assert_eq!(position.next, Some(records[2].id));

        assert_eq!(view.select_next(&records), Some(records[2].id));
        assert_eq!(view.select_next(&records), None);
        assert_eq!(view.selected_record, Some(records[2].id));

        assert_eq!(view.select_prev(&records), Some(records[1].id));
    }

    #[test]
    fn test_navigation_skips_hidden_records() {
        let records = vec![named("Oak Desk"), named("Chair"), named("Oak Shelf")];
        let mut view = ViewState::default();
        view.set_query("oak");
        view.select(records[0].id);

        let position = view.position(&records).unwrap();
        assert_eq!((position.index, position.total), (1, 2));
        assert_eq!(view.select_next(&records), Some(records[2].id));
    }
}
