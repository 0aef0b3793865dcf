//! File type detection and the in-memory upload representation

use crate::error::{IcpError, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "txt" => Some(DocumentFormat::Text),
            _ => None,
        }
    }

    /// Detects the format from a file name such as `resume.PDF`.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                IcpError::UnsupportedFormat(format!("File has no extension: {}", name))
            })?;

        Self::from_extension(extension).ok_or_else(|| {
            IcpError::UnsupportedFormat(format!(
                "Unsupported file extension .{} for {} (allowed: .txt, .pdf)",
                extension, name
            ))
        })
    }
}

/// A document uploaded for a single evaluation request.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedDocument {
    pub name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, format: DocumentFormat, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format,
            bytes,
        }
    }

    /// Builds a document whose format is taken from the file name extension.
    pub fn from_named_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let format = DocumentFormat::from_file_name(&name)?;
        Ok(Self::new(name, format, bytes))
    }
}
