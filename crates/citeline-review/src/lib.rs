//! Citeline Review
//!
//! Everything that happens between "records are stored" and "records leave
//! as CSV": deciding which page and boxes back a field, quick search, the
//! per-cell edit protocol, the selection state of the review table, and
//! export.
//!
//! All of it is pure logic over `citeline-domain` types. The only side
//! effect is the repository write at the end of an edit.
//!
//! # Examples
//!
//! ```
//! use citeline_domain::{CitedField, DocumentId, DocumentType, FieldKey, Record, RecordDraft};
//! use citeline_review::{export_to_csv, default_export_columns, search, ViewState};
//!
//! let record = Record::from_draft(
//!     RecordDraft::new(DocumentId::new(), DocumentType::PurchaseOrder)
//!         .with_field(FieldKey::ItemName, CitedField::manual("Desk"))
//!         .with_field(FieldKey::Manufacturer, CitedField::manual("Acme, Inc.")),
//! );
//! let records = vec![record];
//!
//! let mut view = ViewState::default();
//! view.set_query("acme");
//! let visible = view.visible(&records);
//! assert_eq!(visible.len(), 1);
//! assert!(search::matches(&records[0], "ACME"));
//!
//! let csv = export_to_csv(visible, &default_export_columns());
//! assert!(csv.contains("\"Acme, Inc.\""));
//! ```

#![warn(missing_docs)]

mod edit;
mod error;
mod export;
mod resolution;
pub mod search;
mod view;

pub use edit::{CellEditor, CompositeEditor, EditState};
pub use error::EditError;
pub use export::{
    default_export_columns, escape_csv_field, export_file_name, export_to_csv, ExportColumn,
    CSV_MIME_TYPE, DEFAULT_EXPORT_PREFIX,
};
pub use resolution::{
    highlights_for_page, provenance, resolve_field, target_page, PageNavigator, Provenance,
};
pub use view::{resolve, Position, ViewState};
