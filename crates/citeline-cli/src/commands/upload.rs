//! Upload command implementation.

use super::open_store;
use crate::cli::UploadArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use citeline_backend::ExtractClient;
use citeline_domain::traits::SourceFile;
use citeline_domain::DocumentType;
use citeline_extractor::{Extractor, Ingestor};
use citeline_store::FsStorage;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Execute the upload command.
pub async fn execute_upload(args: UploadArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document_type: DocumentType = args.document_type.into();
    let files = args
        .files
        .iter()
        .map(|path| read_source_file(path))
        .collect::<Result<Vec<_>>>()?;

    let settings = &config.extraction;
    let backend = ExtractClient::from_env(settings.endpoint.as_str(), &settings.api_key_env)?
        .with_max_retries(settings.max_retries);
    let extractor = Extractor::new(backend, config.extractor_config()?);

    let mut storage = FsStorage::new(&config.storage_dir);
    if let Some(base_url) = &config.public_base_url {
        storage = storage.with_base_url(base_url.as_str());
    }

    let store = open_store(config)?;
    let ingestor = Ingestor::new(extractor, Arc::new(storage), Arc::new(Mutex::new(store)));

    info!("Uploading {} file(s) as {}", files.len(), document_type.label());
    let report = ingestor.ingest(files, document_type).await;

    println!("{}", formatter.format_batch_report(&report)?);
    if report.has_failures() {
        return Err(CliError::InvalidInput(format!(
            "{} of {} file(s) failed",
            report.failed(),
            report.files.len()
        )));
    }
    Ok(())
}

/// Read a PDF from disk, named by its file name.
fn read_source_file(path: &Path) -> Result<SourceFile> {
    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(CliError::InvalidInput(format!(
            "{} is not a PDF",
            path.display()
        )));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::InvalidInput(format!("{} has no file name", path.display())))?;
    let bytes = std::fs::read(path)?;
    Ok(SourceFile::new(name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_pdf_by_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Order 12.PDF");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let file = read_source_file(&path).unwrap();
        assert_eq!(file.name, "Order 12.PDF");
        assert_eq!(file.bytes, b"%PDF-1.4".to_vec());
    }

    #[test]
    fn test_rejects_non_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        assert!(matches!(read_source_file(&path), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = read_source_file(&dir.path().join("absent.pdf"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
