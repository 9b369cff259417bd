//! Error types for the pdf2summary library.
//!
//! Every failure is fatal for the run that hit it: nothing is retried and no
//! partial progress is saved. The variants fall into three classes that
//! callers can test for:
//!
//! * **I/O** ([`SummaryError::is_io`]): the PDF cannot be opened or read, or
//!   the Markdown output cannot be written.
//! * **Summarization** ([`SummaryError::is_summarization`]): the completion
//!   API rejected or failed a request.
//! * **Unknown engine**: the engine has no entry in the pricing table. This
//!   is detected before the first request is sent.
//!
//! A user declining a confirmation prompt is *not* an error; see
//! [`crate::reducer::ReductionOutcome::Aborted`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2summary library.
#[derive(Debug, Error)]
pub enum SummaryError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt or the document is encrypted.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Completion API errors ─────────────────────────────────────────────
    /// The API rejected the credentials (401/403).
    #[error("Authentication error from completion API: {detail}\nCheck OPENAI_API_KEY.")]
    AuthError { detail: String },

    /// The API returned HTTP 429.
    #[error("Rate limit exceeded by completion API{}", retry_hint(.retry_after_secs))]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    /// The request did not complete within the configured timeout.
    #[error("Completion request timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    /// Any other API or transport failure.
    #[error("Completion API error: {message}")]
    LlmApiError { message: String },

    /// The API answered successfully but returned no completion choices.
    #[error("Completion API returned no choices for engine '{engine}'")]
    EmptyCompletion { engine: String },

    // ── Pricing errors ────────────────────────────────────────────────────
    /// The engine has no entry in the pricing table.
    #[error("Unknown engine '{engine}'. Known engines: {known}")]
    UnknownEngine { engine: String, known: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn retry_hint(secs: &Option<u64>) -> String {
    match secs {
        Some(s) => format!(" (retry after {s}s)"),
        None => String::new(),
    }
}

impl SummaryError {
    /// File open, read or write failure.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            SummaryError::FileNotFound { .. }
                | SummaryError::PermissionDenied { .. }
                | SummaryError::NotAPdf { .. }
                | SummaryError::CorruptPdf { .. }
                | SummaryError::PdfiumBindingFailed(_)
                | SummaryError::OutputWriteFailed { .. }
        )
    }

    /// Failure of a call to the completion API.
    pub fn is_summarization(&self) -> bool {
        matches!(
            self,
            SummaryError::AuthError { .. }
                | SummaryError::RateLimitExceeded { .. }
                | SummaryError::ApiTimeout { .. }
                | SummaryError::LlmApiError { .. }
                | SummaryError::EmptyCompletion { .. }
        )
    }
}
