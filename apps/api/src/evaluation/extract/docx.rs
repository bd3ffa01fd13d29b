use std::io::{Cursor, Read};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use quick_xml::{events::Event, Reader as XmlReader};
use tracing::{debug, error};
use zip::ZipArchive;

use super::{is_too_short, TextExtractor};
use crate::errors::AppError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the raw text of `word/document.xml` from an Open XML Word archive.
pub struct DocxExtractor;

#[async_trait]
impl TextExtractor for DocxExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, AppError> {
        debug!("[DOCX] Extracting text...");

        let text = tokio::task::spawn_blocking(move || read_docx_text(&bytes))
            .await
            .map_err(|e| anyhow!("DOCX reader aborted: {e}"))
            .and_then(|r| r)
            .map_err(|e| {
                error!("[DOCX] Error: {e:#}");
                AppError::FileProcessing("Failed to extract text from DOCX".to_string())
            })?;

        if is_too_short(&text) {
            return Err(AppError::FileProcessing(
                "DOCX file appears to be empty".to_string(),
            ));
        }

        debug!("[DOCX] Text extracted, length: {}", text.len());
        Ok(text)
    }
}

fn read_docx_text(data: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(data)).context("failed to open DOCX archive")?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .with_context(|| format!("missing {DOCUMENT_PART}"))?
        .read_to_string(&mut xml)
        .context("failed to read DOCX XML")?;

    document_xml_text(&xml)
}

/// Collects `<w:t>` runs; tabs, breaks and paragraph ends become whitespace.
fn document_xml_text(xml: &str) -> Result<String> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = true,
                b"w:tab" => output.push('\t'),
                b"w:br" | b"w:cr" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => output.push('\t'),
                b"w:br" | b"w:cr" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e.unescape().map_err(|err| anyhow!(err))?;
                    output.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = false,
                b"w:p" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(anyhow!("failed to parse DOCX XML: {err}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(output.trim().to_string())
}
