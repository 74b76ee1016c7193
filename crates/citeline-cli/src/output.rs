//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use citeline_domain::{BoundingBox, Document, DocumentStatus, FieldKey, Record, RecordId};
use citeline_extractor::{BatchReport, FileOutcome};
use citeline_review::{Position, Provenance};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest cell value shown in the records table.
const CELL_WIDTH: usize = 40;

/// One resolved field of the selected record, as shown by `show`.
#[derive(Debug, Clone)]
pub struct FieldView<'a> {
    /// Selected record
    pub record: &'a Record,
    /// Field being inspected
    pub key: FieldKey,
    /// Badge for the field
    pub provenance: Provenance,
    /// Page the viewer opens on
    pub page: u32,
    /// Regions to highlight on that page
    pub highlights: Vec<BoundingBox>,
    /// Place of the record among the visible rows
    pub position: Option<Position>,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Output format in effect.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format records in table order.
    ///
    /// Records whose ids are not in `viewed` are flagged as new.
    pub fn format_records(&self, records: &[&Record], viewed: &[RecordId]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|r| r.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No records found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["", "ID", "Item", "Manufacturer", "Spec ID", "Project", "Type"]);

                for record in records {
                    let marker = if viewed.contains(&record.id) { "" } else { "●" };
                    builder.push_record([
                        marker.to_string(),
                        record.id.short(),
                        truncate(&record.item_name.value),
                        truncate(&record.manufacturer.value),
                        self.spec_cell(record),
                        truncate(&record.project.value),
                        record.document_type.abbreviation().to_string(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(table.to_string())
            }
        }
    }

    /// Format uploaded documents.
    pub fn format_documents(&self, documents: &[Document]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(documents)?),
            OutputFormat::Quiet => Ok(documents
                .iter()
                .map(|d| d.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if documents.is_empty() {
                    return Ok(self.colorize("No documents found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Type", "Status", "Uploaded", "Path"]);

                for doc in documents {
                    let status = match (&doc.status, &doc.error) {
                        (DocumentStatus::Error, Some(message)) => {
                            format!("{}: {}", doc.status, truncate(message))
                        }
                        _ => doc.status.to_string(),
                    };
                    builder.push_record([
                        doc.id.short(),
                        doc.original_name.clone(),
                        doc.document_type.label().to_string(),
                        status,
                        doc.upload_date.to_string(),
                        doc.filename.clone(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(table.to_string())
            }
        }
    }

    /// Format one field of a record with its citations.
    pub fn format_field_view(&self, view: &FieldView<'_>) -> Result<String> {
        let field = view.record.field(view.key);
        match self.format {
            OutputFormat::Json => {
                let position = match view.position {
                    Some(p) => serde_json::json!({
                        "index": p.index,
                        "total": p.total,
                        "prev": p.prev.map(|id| id.to_string()),
                        "next": p.next.map(|id| id.to_string()),
                    }),
                    None => serde_json::Value::Null,
                };
                let value = serde_json::json!({
                    "record": view.record,
                    "field": view.key.as_str(),
                    "value": field.value,
                    "provenance": view.provenance.to_string(),
                    "page": view.page,
                    "highlights": view.highlights,
                    "position": position,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(field.value.clone()),
            OutputFormat::Table => {
                let mut lines = Vec::new();
                lines.push(format!(
                    "{} {}",
                    self.colorize("Record", "cyan"),
                    view.record.id
                ));
                if let Some(position) = view.position {
                    lines.push(format!("Row {} of {}", position.index, position.total));
                }
                lines.push(String::new());

                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, value) in view.record.fields() {
                    let label = if key == view.key {
                        format!("▶ {}", key.label())
                    } else {
                        key.label().to_string()
                    };
                    builder.push_record([label, value.value.clone()]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                lines.push(table.to_string());

                lines.push(String::new());
                lines.push(format!("{}: {}", view.key.label(), view.provenance));
                lines.push(format!("Page: {}", view.page));
                for (i, bbox) in view.highlights.iter().enumerate() {
                    lines.push(format!(
                        "  [{}] left {:.3} top {:.3} width {:.3} height {:.3}",
                        i + 1,
                        bbox.left,
                        bbox.top,
                        bbox.width,
                        bbox.height
                    ));
                }
                for citation in field.citations() {
                    lines.push(format!(
                        "  {} p.{}: {}",
                        citation.block_type,
                        citation.page(),
                        truncate(&citation.content)
                    ));
                }

                if let Some(position) = view.position {
                    if let Some(prev) = position.prev {
                        lines.push(format!("Previous: {}", prev.short()));
                    }
                    if let Some(next) = position.next {
                        lines.push(format!("Next: {}", next.short()));
                    }
                }

                Ok(lines.join("\n"))
            }
        }
    }

    /// Format the per-file results of an upload.
    pub fn format_batch_report(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let files: Vec<serde_json::Value> = report
                    .files
                    .iter()
                    .map(|(name, outcome)| match outcome {
                        FileOutcome::Completed { document_id, records } => serde_json::json!({
                            "file": name,
                            "status": "completed",
                            "documentId": document_id.to_string(),
                            "records": records,
                        }),
                        FileOutcome::Failed { document_id, error } => serde_json::json!({
                            "file": name,
                            "status": "failed",
                            "documentId": document_id.map(|id| id.to_string()),
                            "error": error,
                        }),
                        FileOutcome::Skipped => serde_json::json!({
                            "file": name,
                            "status": "skipped",
                        }),
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&files)?)
            }
            OutputFormat::Quiet => Ok(report
                .files
                .iter()
                .filter_map(|(_, outcome)| match outcome {
                    FileOutcome::Completed { document_id, .. } => Some(document_id.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut lines = Vec::with_capacity(report.files.len() + 1);
                for (name, outcome) in &report.files {
                    let line = match outcome {
                        FileOutcome::Completed { records, .. } => {
                            self.success(&format!("{}: {} record(s)", name, records))
                        }
                        FileOutcome::Failed { error, .. } => {
                            self.error(&format!("{}: {}", name, error))
                        }
                        FileOutcome::Skipped => self.warning(&format!("{}: skipped", name)),
                    };
                    lines.push(line);
                }
                lines.push(self.info(&format!(
                    "{} completed, {} failed, {} skipped, {} record(s) created",
                    report.completed(),
                    report.failed(),
                    report.skipped(),
                    report.records_created()
                )));
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn spec_cell(&self, record: &Record) -> String {
        let value = truncate(&record.spec_id_number.value);
        if record.spec_id_number.is_generated() && !record.spec_id_number.is_missing() {
            self.colorize(&format!("{} (AI)", value), "magenta")
        } else {
            value
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn truncate(value: &str) -> String {
    let value = value.trim();
    if value.chars().count() <= CELL_WIDTH {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeline_domain::{
        BlockType, Citation, CitedField, Confidence, DocumentDraft, DocumentId, DocumentType,
        RecordDraft,
    };

    fn create_test_record() -> Record {
        Record::from_draft(
            RecordDraft::new(DocumentId::new(), DocumentType::PurchaseOrder)
                .with_field(
                    FieldKey::ItemName,
                    CitedField::new(
                        "Ceiling Tile",
                        vec![Citation::new(
                            BlockType::Table,
                            "Ceiling Tile 2x2",
                            BoundingBox::new(0.1, 0.2, 0.3, 0.05, 2),
                            Confidence::High,
                        )],
                    ),
                )
                .with_field(FieldKey::Manufacturer, CitedField::manual("Armstrong"))
                .with_field(FieldKey::SpecIdNumber, CitedField::manual("09 51 00")),
        )
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let record = create_test_record();
        let output = formatter.format_records(&[&record], &[]).unwrap();
        assert!(output.contains("itemName"));
        assert!(output.contains("Armstrong"));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let record = create_test_record();
        let output = formatter.format_records(&[&record], &[]).unwrap();
        assert_eq!(output, record.id.to_string());
    }

    #[test]
    fn test_table_flags_new_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let seen = create_test_record();
        let fresh = create_test_record();
        let output = formatter.format_records(&[&seen, &fresh], &[seen.id]).unwrap();
        assert!(output.contains("Manufacturer"));
        assert!(output.contains("09 51 00 (AI)"));
        assert_eq!(output.matches('●').count(), 1);
    }

    #[test]
    fn test_empty_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_records(&[], &[]).unwrap();
        assert!(output.contains("No records found"));
    }

    #[test]
    fn test_documents_table_shows_error() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut doc = Document::from_draft(DocumentDraft {
            filename: "public/po-1-abc.pdf".to_string(),
            original_name: "po.pdf".to_string(),
            document_type: DocumentType::PurchaseOrder,
        });
        doc.status = DocumentStatus::Error;
        doc.error = Some("timeout".to_string());

        let output = formatter.format_documents(&[doc]).unwrap();
        assert!(output.contains("po.pdf"));
        assert!(output.contains("timeout"));
    }

    #[test]
    fn test_field_view_lists_citations() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let record = create_test_record();
        let view = FieldView {
            record: &record,
            key: FieldKey::ItemName,
            provenance: citeline_review::provenance(FieldKey::ItemName, &record.item_name),
            page: 2,
            highlights: citeline_review::highlights_for_page(&record, Some(FieldKey::ItemName), 2),
            position: None,
        };
        let output = formatter.format_field_view(&view).unwrap();
        assert!(output.contains("Page: 2"));
        assert!(output.contains("Ceiling Tile 2x2"));
        assert!(output.contains("high confidence"));
    }

    #[test]
    fn test_batch_report() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let report = BatchReport {
            files: vec![
                (
                    "a.pdf".to_string(),
                    FileOutcome::Completed {
                        document_id: DocumentId::new(),
                        records: 3,
                    },
                ),
                (
                    "b.pdf".to_string(),
                    FileOutcome::Failed {
                        document_id: None,
                        error: "boom".to_string(),
                    },
                ),
            ],
        };
        let output = formatter.format_batch_report(&report).unwrap();
        assert!(output.contains("✓ a.pdf: 3 record(s)"));
        assert!(output.contains("✗ b.pdf: boom"));
        assert!(output.contains("1 completed, 1 failed, 0 skipped, 3 record(s) created"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }

    #[test]
    fn test_truncate_long_values() {
        let long = "x".repeat(CELL_WIDTH + 10);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), CELL_WIDTH);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate(" short "), "short");
    }
}
