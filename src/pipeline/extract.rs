//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which is blocking
//! and keeps thread-local state. `tokio::task::spawn_blocking` moves the work
//! onto the blocking pool so the runtime's worker threads keep running.
//!
//! A page whose text layer cannot be read (scanned image, broken content
//! stream) is logged and contributes nothing; only failures to open the
//! document itself are fatal.

use crate::document::DocumentMetadata;
use crate::error::SummaryError;
use crate::progress::ProgressCallback;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Text and metadata pulled from a PDF.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Per-page text concatenated in page order, no separators.
    pub text: String,
    pub metadata: DocumentMetadata,
    /// Pages that yielded no text (empty or failed).
    pub empty_pages: usize,
}

/// Extract the text of every page of `pdf_path`.
pub async fn extract_text(
    pdf_path: &Path,
    progress: Option<ProgressCallback>,
) -> Result<ExtractedText, SummaryError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || extract_text_blocking(&path, progress.as_ref()))
        .await
        .map_err(|e| SummaryError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Read document metadata without touching page content.
pub async fn extract_metadata(pdf_path: &Path) -> Result<DocumentMetadata, SummaryError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &path)?;
        Ok(read_metadata(&document))
    })
    .await
    .map_err(|e| SummaryError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_text_blocking(
    pdf_path: &Path,
    progress: Option<&ProgressCallback>,
) -> Result<ExtractedText, SummaryError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path)?;
    let metadata = read_metadata(&document);
    let total_pages = metadata.page_count;
    info!("PDF loaded: {} pages", total_pages);

    if let Some(cb) = progress {
        cb.on_extraction_start(total_pages);
    }

    let mut text = String::new();
    let mut empty_pages = 0usize;

    for (idx, page) in document.pages().iter().enumerate() {
        let page_num = idx + 1;
        match page.text() {
            Ok(page_text) => {
                let content = page_text.all();
                if content.is_empty() {
                    debug!("Page {} has no text layer", page_num);
                    empty_pages += 1;
                } else {
                    debug!("Page {}: {} bytes", page_num, content.len());
                    text.push_str(&content);
                }
            }
            Err(e) => {
                warn!("Page {}: text extraction failed, skipping: {:?}", page_num, e);
                empty_pages += 1;
            }
        }

        if let Some(cb) = progress {
            cb.on_page_extracted(page_num, total_pages);
        }
    }

    info!(
        "Extracted {} bytes from {} pages ({} empty)",
        text.len(),
        total_pages,
        empty_pages
    );

    Ok(ExtractedText {
        text,
        metadata,
        empty_pages,
    })
}

fn bind_pdfium() -> Result<Pdfium, SummaryError> {
    pdfium_auto::bind_pdfium_silent()
        .map_err(|e| SummaryError::PdfiumBindingFailed(e.to_string()))
}

fn open_document<'a>(pdfium: &'a Pdfium, pdf_path: &Path) -> Result<PdfDocument<'a>, SummaryError> {
    pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| SummaryError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })
}

fn read_metadata(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        page_count: document.pages().len() as usize,
    }
}
