//! Text extraction: turns an uploaded document into plain text.
//!
//! One `TextExtractor` per document family, selected by the validated
//! `DocumentKind`. Each extraction settles exactly once: text or an error.

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::AppError;
use crate::evaluation::upload::DocumentKind;

mod docx;
mod pdf;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;

/// Minimum number of characters an extraction must yield to be usable.
pub const MIN_TEXT_CHARS: usize = 50;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes) -> Result<String, AppError>;
}

pub fn extractor_for(kind: DocumentKind) -> &'static dyn TextExtractor {
    match kind {
        DocumentKind::Pdf => &PdfExtractor,
        DocumentKind::Word => &DocxExtractor,
    }
}

pub(crate) fn is_too_short(text: &str) -> bool {
    text.chars().count() < MIN_TEXT_CHARS
}
