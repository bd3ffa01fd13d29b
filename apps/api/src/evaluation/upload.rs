//! Multipart parsing and file validation for CV uploads.

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Body limit for the upload route. Leaves room for multipart framing and
/// lets oversize files reach `validate_document` instead of being cut off.
pub const MAX_REQUEST_BYTES: usize = MAX_FILE_SIZE + 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const ALLOWED_MIME_TYPES: &[&str] = &[MIME_PDF, MIME_DOC, MIME_DOCX];

/// Which extractor a validated document goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// Word documents. Legacy `.doc` lands here too and fails in the DOCX reader.
    Word,
}

/// An uploaded file, exactly as the client declared it. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            size: bytes.len(),
            bytes,
        }
    }
}

/// Parsed form fields from `POST /api/cv-evaluate`.
#[derive(Debug, Default)]
pub struct EvaluationForm {
    pub file: Option<UploadedDocument>,
    pub job_role: Option<String>,
}

/// Reads the `file` and `jobRole` fields; anything else is drained and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<EvaluationForm, AppError> {
    let mut form = EvaluationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form data: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file data: {e}")))?;
                form.file = Some(UploadedDocument::new(filename, content_type, data));
            }
            "jobRole" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read jobRole: {e}")))?;
                form.job_role = Some(value);
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    Ok(form)
}

/// Checks, in order: presence, declared MIME type, declared size.
/// The declared type is trusted; see `sniff_signature` for the advisory check.
pub fn validate_document(document: Option<&UploadedDocument>) -> Result<DocumentKind, AppError> {
    let document = document.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let kind = match document.content_type.as_str() {
        MIME_PDF => DocumentKind::Pdf,
        MIME_DOC | MIME_DOCX => DocumentKind::Word,
        _ => {
            return Err(AppError::Validation(
                "Invalid file type. Please upload a PDF or Word document".to_string(),
            ))
        }
    };

    if document.size > MAX_FILE_SIZE {
        return Err(AppError::Validation(
            "File size exceeds 5MB limit".to_string(),
        ));
    }

    Ok(kind)
}

/// File signature families recognised by `sniff_signature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Pdf,
    /// ZIP container (DOCX and other OOXML files).
    Zip,
    /// OLE2 compound file (legacy `.doc`).
    Ole,
}

/// Identifies the file family from its leading bytes.
pub fn sniff_signature(data: &[u8]) -> Option<Signature> {
    if data.starts_with(b"%PDF-") {
        Some(Signature::Pdf)
    } else if data.starts_with(b"PK\x03\x04") {
        Some(Signature::Zip)
    } else if data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
        Some(Signature::Ole)
    } else {
        None
    }
}

/// Whether the sniffed bytes agree with the declared MIME type.
pub fn signature_matches(content_type: &str, signature: Option<Signature>) -> bool {
    matches!(
        (content_type, signature),
        (MIME_PDF, Some(Signature::Pdf))
            | (MIME_DOCX, Some(Signature::Zip))
            | (MIME_DOC, Some(Signature::Ole))
    )
}
