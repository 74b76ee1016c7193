//! CSV export of the review table

use citeline_domain::{FieldKey, Record};
use std::borrow::Cow;

/// MIME type of exported files
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// File name prefix when none is given
pub const DEFAULT_EXPORT_PREFIX: &str = "citeline-products";

/// One exported column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumn {
    /// Field the column reads
    pub key: FieldKey,
    /// Header text
    pub label: String,
    /// Whether the column is written at all
    pub enabled: bool,
}

impl ExportColumn {
    /// Create a column
    pub fn new(key: FieldKey, label: impl Into<String>, enabled: bool) -> Self {
        Self {
            key,
            label: label.into(),
            enabled,
        }
    }
}

/// Column set of the export dialog, in table order
///
/// Project and details start disabled.
pub fn default_export_columns() -> Vec<ExportColumn> {
    vec![
        ExportColumn::new(FieldKey::ItemName, "Product Name", true),
        ExportColumn::new(FieldKey::ProductDescription, "Product Description", true),
        ExportColumn::new(FieldKey::Manufacturer, "Manufacturer", true),
        ExportColumn::new(FieldKey::Tag, "Tag", true),
        ExportColumn::new(FieldKey::SpecIdNumber, "Masterformat Code", true),
        ExportColumn::new(FieldKey::Project, "Project", false),
        ExportColumn::new(FieldKey::Finish, "Finish", true),
        ExportColumn::new(FieldKey::Size, "Size", true),
        ExportColumn::new(FieldKey::Price, "Price", true),
        ExportColumn::new(FieldKey::Details, "Details", false),
    ]
}

/// Quote a value if it contains a comma, quote or line break
pub fn escape_csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Render `records` as CSV
///
/// Only enabled columns appear, headed by their labels. Rows keep input
/// order and are separated by `\n`.
pub fn export_to_csv<'a, I>(records: I, columns: &[ExportColumn]) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let enabled: Vec<&ExportColumn> = columns.iter().filter(|c| c.enabled).collect();

    let mut lines = Vec::new();
    lines.push(
        enabled
            .iter()
            .map(|c| escape_csv_field(&c.label))
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        lines.push(
            enabled
                .iter()
                .map(|c| escape_csv_field(&record.field(c.key).value))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// `<prefix>-<date>.csv`, with `date` already in ISO form
pub fn export_file_name(prefix: &str, date: &str) -> String {
    let prefix = if prefix.trim().is_empty() {
        DEFAULT_EXPORT_PREFIX
    } else {
        prefix.trim()
    };
    format!("{}-{}.csv", prefix, date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeline_domain::{CitedField, DocumentId, DocumentType, RecordDraft};

    fn desk() -> Record {
        Record::from_draft(
            RecordDraft::new(DocumentId::new(), DocumentType::PurchaseOrder)
                .with_field(FieldKey::ItemName, CitedField::manual("Desk"))
                .with_field(FieldKey::Manufacturer, CitedField::manual("Acme")),
        )
    }

    #[test]
    fn test_disabled_column_is_absent() {
        let columns = vec![
            ExportColumn::new(FieldKey::ItemName, "Product Name", true),
            ExportColumn::new(FieldKey::Manufacturer, "Manufacturer", false),
        ];
        let records = [desk()];
        assert_eq!(export_to_csv(&records, &columns), "Product Name\nDesk");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_csv_field("Acme, Inc."), "\"Acme, Inc.\"");
        assert_eq!(escape_csv_field("6\" Wide"), "\"6\"\" Wide\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_csv_field("plain"), "plain");
    }

    #[test]
    fn test_missing_values_are_empty_cells() {
        let columns = vec![
            ExportColumn::new(FieldKey::ItemName, "Product Name", true),
            ExportColumn::new(FieldKey::Price, "Price", true),
        ];
        let records = [desk()];
        assert_eq!(export_to_csv(&records, &columns), "Product Name,Price\nDesk,");
    }

    #[test]
    fn test_header_only_without_records() {
        let records: Vec<Record> = Vec::new();
        let csv = export_to_csv(&records, &default_export_columns());
        assert_eq!(
            csv,
            "Product Name,Product Description,Manufacturer,Tag,Masterformat Code,Finish,Size,Price"
        );
    }

    #[test]
    fn test_default_columns_cover_every_field_once() {
        let columns = default_export_columns();
        assert_eq!(columns.len(), FieldKey::ALL.len());
        for key in FieldKey::ALL {
            assert_eq!(columns.iter().filter(|c| c.key == key).count(), 1, "{}", key);
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            export_file_name("", "2024-06-10"),
            "citeline-products-2024-06-10.csv"
        );
        assert_eq!(export_file_name("lobby", "2024-06-10"), "lobby-2024-06-10.csv");
    }
}
