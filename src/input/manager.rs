//! Input manager for loading uploads from disk

use crate::error::{IcpError, Result};
use crate::input::file_detector::UploadedDocument;
use crate::input::text_extractor;
use log::info;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Reads a `.txt` or `.pdf` file into an [`UploadedDocument`].
    pub async fn load(&self, path: &Path) -> Result<UploadedDocument> {
        if !path.exists() {
            return Err(IcpError::Validation(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        // Check the extension before reading so unsupported files fail fast
        crate::input::DocumentFormat::from_file_name(&name)?;

        let bytes = fs::read(path).await?;
        info!("Loaded {} ({} bytes)", path.display(), bytes.len());

        UploadedDocument::from_named_bytes(name, bytes)
    }

    /// Loads an optional path; `None` stays `None`.
    pub async fn load_optional(&self, path: Option<&Path>) -> Result<Option<UploadedDocument>> {
        match path {
            Some(path) => self.load(path).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn extract_path(&self, path: &Path) -> Result<String> {
        let document = self.load(path).await?;
        info!("Extracting {:?} text from {}", document.format, path.display());
        text_extractor::extract(Some(&document))
    }
}
