//! Local object storage for uploaded PDFs

use crate::StoreError;
use citeline_domain::traits::{ObjectStorage, SourceFile};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Folder every stored file is placed under
pub const STORAGE_PREFIX: &str = "public";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 7;
const DEFAULT_EXTENSION: &str = "pdf";

/// Collision-resistant stored name for an uploaded file
///
/// `Order #12.PDF` becomes something like `order-12-1718035200000-k3j9x0a.pdf`:
/// a lowercase base made of alphanumerics and single hyphens, the upload
/// time in milliseconds and a random base-36 suffix. The extension is kept
/// (lowercased) and defaults to `pdf`.
pub fn unique_filename(original: &str) -> String {
    let (stem, ext) = match original.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext),
        _ => (original, DEFAULT_EXTENSION),
    };

    let mut base = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            base.push(c.to_ascii_lowercase());
        } else if !base.is_empty() && !base.ends_with('-') {
            base.push('-');
        }
    }
    let base = base.trim_end_matches('-');
    let base = if base.is_empty() { "file" } else { base };

    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let ext = if ext.is_empty() { DEFAULT_EXTENSION.to_string() } else { ext };

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    format!("{}-{}-{}.{}", base, millis, random_suffix(), ext)
}

fn random_suffix() -> String {
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        out.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

/// Filesystem-backed [`ObjectStorage`]
///
/// Files land in `<root>/public/<unique name>`; the returned path is
/// relative to `root`.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    base_url: Option<String>,
}

impl FsStorage {
    /// Storage rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            base_url: None,
        }
    }

    /// Serve stored paths from `base_url` instead of `file://` URLs
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored path
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl ObjectStorage for FsStorage {
    type Error = StoreError;

    async fn store(&self, file: &SourceFile) -> Result<String, Self::Error> {
        let dir = self.root.join(STORAGE_PREFIX);
        tokio::fs::create_dir_all(&dir).await?;

        let name = unique_filename(&file.name);
        let mut handle = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&name))
            .await?;
        handle.write_all(&file.bytes).await?;
        handle.flush().await?;

        let path = format!("{}/{}", STORAGE_PREFIX, name);
        debug!("Stored {} ({} bytes) at {}", file.name, file.bytes.len(), path);
        Ok(path)
    }

    fn url_for(&self, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}", base, path.trim_start_matches('/')),
            None => format!("file://{}", self.resolve(path).display()),
        }
    }
}
