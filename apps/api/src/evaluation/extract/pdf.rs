use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, error};

use super::{is_too_short, TextExtractor};
use crate::errors::AppError;

const PARSE_FAILED: &str =
    "Failed to parse PDF. The file may be corrupted or password-protected.";
const NO_TEXT_LAYER: &str = "Could not extract readable text from PDF. \
    The PDF may be a scanned image or contain no extractable text. \
    Please convert to DOCX format.";

/// Extracts the text layer of every page, in document order.
///
/// `pdf-extract` is synchronous and can panic on malformed input, so it runs on
/// the blocking pool; a panic surfaces as a join error and is reported like
/// any other parse failure.
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, AppError> {
        debug!("[PDF] Extracting text...");

        let parsed = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| {
            error!("[PDF] Parser aborted: {e}");
            AppError::FileProcessing(PARSE_FAILED.to_string())
        })?
        .map_err(|e| {
            error!("[PDF] Parse error: {e}");
            AppError::FileProcessing(PARSE_FAILED.to_string())
        })?;

        let text = join_runs(&parsed);
        if is_too_short(&text) {
            return Err(AppError::FileProcessing(NO_TEXT_LAYER.to_string()));
        }

        debug!("[PDF] Text extracted, length: {}", text.len());
        Ok(text)
    }
}

/// Joins the extracted runs with single spaces, dropping the layout
/// line breaks and page feeds that `pdf-extract` emits.
fn join_runs(raw: &str) -> String {
    raw.split(['\n', '\r', '\x0c'])
        .map(str::trim)
        .filter(|run| !run.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
