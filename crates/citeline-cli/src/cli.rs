//! CLI command definitions and argument parsing.

use citeline_domain::{DocumentType, FieldKey};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Citeline CLI - Extract, review and export cited product records from PDFs.
#[derive(Debug, Parser)]
#[command(name = "citeline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CITELINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload PDFs and extract their product records
    Upload(UploadArgs),

    /// List records in table order
    List(ListArgs),

    /// Show one field of a record with its source citations
    Show(ShowArgs),

    /// Edit the value of one field, keeping its citations
    Edit(EditArgs),

    /// Edit name and description together
    Rename(RenameArgs),

    /// Export records to CSV
    Export(ExportArgs),

    /// Fill missing classification codes
    Backfill(BackfillArgs),

    /// List uploaded documents and their status
    Documents,

    /// Delete a record
    Delete(DeleteArgs),

    /// Delete a document and all of its records
    DeleteDocument(DeleteDocumentArgs),

    /// Write a default configuration file
    InitConfig(InitConfigArgs),
}

/// Arguments for the upload command.
#[derive(Debug, Parser)]
pub struct UploadArgs {
    /// PDF files, processed in the given order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Kind of document
    #[arg(short = 't', long = "type", value_enum, default_value = "purchase-order")]
    pub document_type: DocumentTypeArg,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Quick search over name, manufacturer, classification code and project
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only records from this document
    #[arg(short, long)]
    pub document: Option<String>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Record ID
    pub record: String,

    /// Field to resolve (defaults to the item name)
    #[arg(short = 'k', long, value_parser = parse_field_key)]
    pub field: Option<FieldKey>,

    /// Quick search defining the visible records
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page count of the source PDF, to bound navigation
    #[arg(short, long)]
    pub pages: Option<u32>,
}

/// Arguments for the edit command.
#[derive(Debug, Parser)]
pub struct EditArgs {
    /// Record ID
    pub record: String,

    /// Field to edit
    #[arg(value_parser = parse_field_key)]
    pub field: FieldKey,

    /// New value
    pub value: String,
}

/// Arguments for the rename command.
#[derive(Debug, Parser)]
pub struct RenameArgs {
    /// Record ID
    pub record: String,

    /// New product name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New product description
    #[arg(short, long)]
    pub description: Option<String>,
}

/// Arguments for the export command.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Directory to write the CSV file into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Comma-separated fields to export, in default column order
    #[arg(short = 'C', long, value_delimiter = ',', value_parser = parse_field_key)]
    pub columns: Option<Vec<FieldKey>>,

    /// Export only records matching this quick search
    #[arg(short, long)]
    pub search: Option<String>,

    /// File name prefix
    #[arg(short, long)]
    pub prefix: Option<String>,
}

/// Arguments for the backfill command.
#[derive(Debug, Parser)]
pub struct BackfillArgs {
    /// Classify but do not save
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the delete command.
#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Record ID
    pub record: String,
}

/// Arguments for the delete-document command.
#[derive(Debug, Parser)]
pub struct DeleteDocumentArgs {
    /// Document ID
    pub document: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the init-config command.
#[derive(Debug, Parser)]
pub struct InitConfigArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Document type argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DocumentTypeArg {
    /// Purchase order
    PurchaseOrder,
    /// Specification
    Specification,
    /// Drawing
    Drawing,
    /// Request for information
    Rfi,
    /// Submittal
    Submittal,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<DocumentTypeArg> for DocumentType {
    fn from(arg: DocumentTypeArg) -> Self {
        match arg {
            DocumentTypeArg::PurchaseOrder => DocumentType::PurchaseOrder,
            DocumentTypeArg::Specification => DocumentType::Specification,
            DocumentTypeArg::Drawing => DocumentType::Drawing,
            DocumentTypeArg::Rfi => DocumentType::Rfi,
            DocumentTypeArg::Submittal => DocumentType::Submittal,
        }
    }
}

/// Parse a field name such as `itemName`, `item-name` or `spec_id_number`.
fn parse_field_key(s: &str) -> Result<FieldKey, String> {
    FieldKey::parse(s).ok_or_else(|| {
        let known: Vec<&str> = FieldKey::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown field '{}', expected one of: {}", s, known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_command() {
        let cli = Cli::parse_from(["citeline", "upload", "a.pdf", "b.pdf", "--type", "specification"]);
        match cli.command {
            Command::Upload(args) => {
                assert_eq!(args.files.len(), 2);
                assert!(matches!(args.document_type, DocumentTypeArg::Specification));
            }
            _ => panic!("Expected Upload command"),
        }
    }

    #[test]
    fn test_edit_parses_field_key() {
        let cli = Cli::parse_from(["citeline", "edit", "some-id", "spec-id-number", "09 51 00"]);
        match cli.command {
            Command::Edit(args) => {
                assert_eq!(args.field, FieldKey::SpecIdNumber);
                assert_eq!(args.value, "09 51 00");
            }
            _ => panic!("Expected Edit command"),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = Cli::try_parse_from(["citeline", "edit", "some-id", "colour", "red"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_columns() {
        let cli = Cli::parse_from(["citeline", "export", "--columns", "itemName,manufacturer"]);
        match cli.command {
            Command::Export(args) => {
                assert_eq!(
                    args.columns,
                    Some(vec![FieldKey::ItemName, FieldKey::Manufacturer])
                );
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_export_short_flags_with_global_config() {
        let cli = Cli::parse_from([
            "citeline", "export", "-C", "item-name,finish", "-c", "alt.toml", "-o", "out",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        match cli.command {
            Command::Export(args) => {
                assert_eq!(args.columns, Some(vec![FieldKey::ItemName, FieldKey::Finish]));
                assert_eq!(args.output, PathBuf::from("out"));
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["citeline", "documents", "--format", "json", "--verbose"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.verbose);
    }

    #[test]
    fn test_document_type_conversion() {
        let doc_type: DocumentType = DocumentTypeArg::Rfi.into();
        assert_eq!(doc_type, DocumentType::Rfi);
    }
}
