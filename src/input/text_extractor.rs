//! Text extraction from uploaded documents

use crate::error::{IcpError, Result};
use crate::input::file_detector::{DocumentFormat, UploadedDocument};
use log::debug;

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed inputs instead of returning an error
        let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|_| IcpError::DocumentParse("PDF parser aborted on malformed input".to_string()))?
            .map_err(|e| IcpError::DocumentParse(format!("Failed to extract text from PDF: {}", e)))?;

        debug!("Extracted {} PDF pages", pages.len());

        let mut text = String::new();
        for page in &pages {
            text.push_str(page);
            text.push('\n');
        }
        Ok(text)
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(decode_utf8_ignoring_invalid(bytes))
    }
}

/// Decodes UTF-8, dropping invalid byte sequences.
pub fn decode_utf8_ignoring_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Converts an optional upload into trimmed plain text. No document means no text.
pub fn extract(document: Option<&UploadedDocument>) -> Result<String> {
    let Some(document) = document else {
        return Ok(String::new());
    };

    let text = match document.format {
        DocumentFormat::Pdf => PdfExtractor.extract(&document.bytes).map_err(|e| match e {
            IcpError::DocumentParse(msg) => {
                IcpError::DocumentParse(format!("{}: {}", document.name, msg))
            }
            other => other,
        })?,
        DocumentFormat::Text => PlainTextExtractor.extract(&document.bytes)?,
    };

    Ok(text.trim().to_string())
}
