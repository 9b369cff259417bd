//! Entry points: load a PDF, reduce it, write the Markdown.
//!
//! [`summarize_pdf`] and [`summarize_to_file`] cover the common cases;
//! [`load_document`] and [`summarize_document`] are the two halves for
//! callers that want to look at the text (or its cost) in between.

use crate::config::SummaryConfig;
use crate::decision::DecisionProvider;
use crate::document::{Document, DocumentMetadata};
use crate::error::SummaryError;
use crate::markdown::{default_output_path, write_markdown};
use crate::pipeline::llm::{CompletionBackend, SummarizationClient};
use crate::pipeline::{extract, input};
use crate::reducer::{ReductionOutcome, SummaryReducer, SummaryRun};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Title and author to use instead of what the PDF declares.
#[derive(Debug, Clone, Default)]
pub struct DocumentOverrides {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// A loaded document and what became of its reduction.
#[derive(Debug, Clone)]
pub struct PdfSummary {
    pub document: Document,
    pub outcome: ReductionOutcome,
}

/// A completed run that was written to disk.
#[derive(Debug, Clone)]
pub struct SavedSummary {
    pub path: PathBuf,
    pub run: SummaryRun,
}

/// Extract and clean the text of `path`.
///
/// The title is, in order of preference: the override, the PDF's `Title`
/// metadata, the file stem. The author falls back to the PDF's `Author`
/// metadata and then to an empty string.
///
/// # Errors
/// I/O class errors only: missing or unreadable file, not a PDF, corrupt
/// PDF, pdfium unavailable.
pub async fn load_document(
    path: impl AsRef<Path>,
    overrides: &DocumentOverrides,
    config: &SummaryConfig,
) -> Result<Document, SummaryError> {
    let start = Instant::now();
    let pdf_path = input::resolve_local(path)?;
    info!("Loading {}", pdf_path.display());

    let extracted = extract::extract_text(&pdf_path, config.progress_callback.clone()).await?;
    if extracted.text.trim().is_empty() {
        warn!(
            "No text extracted from {} ({} pages); the PDF may be scanned images",
            pdf_path.display(),
            extracted.metadata.page_count
        );
    }

    let title = overrides
        .title
        .clone()
        .or(extracted.metadata.title)
        .unwrap_or_else(|| input::title_from_path(&pdf_path));
    let author = overrides
        .author
        .clone()
        .or(extracted.metadata.author)
        .unwrap_or_default();

    let document = Document::new(title, author, extracted.text, config.clean);
    info!(
        "Loaded '{}': {} words after cleaning in {}ms",
        document.title(),
        document.word_count(),
        start.elapsed().as_millis()
    );
    Ok(document)
}

/// Run the reducer over the cleaned text of `document`.
pub async fn summarize_document<B, D>(
    document: &Document,
    client: &SummarizationClient<B>,
    decider: D,
    config: &SummaryConfig,
) -> Result<ReductionOutcome, SummaryError>
where
    B: CompletionBackend,
    D: DecisionProvider,
{
    info!("Summarizing '{}' with engine {}", document.title(), config.engine);
    SummaryReducer::new(client, decider, config)
        .run(document.cleaned_text())
        .await
}

/// [`load_document`] followed by [`summarize_document`].
pub async fn summarize_pdf<B, D>(
    path: impl AsRef<Path>,
    overrides: &DocumentOverrides,
    client: &SummarizationClient<B>,
    decider: D,
    config: &SummaryConfig,
) -> Result<PdfSummary, SummaryError>
where
    B: CompletionBackend,
    D: DecisionProvider,
{
    let document = load_document(path, overrides, config).await?;
    let outcome = summarize_document(&document, client, decider, config).await?;
    Ok(PdfSummary { document, outcome })
}

/// Summarize `path` and write the Markdown.
///
/// `output` defaults to [`default_output_path`] for the document title.
/// Returns `Ok(None)` when the user declined: nothing is written then.
pub async fn summarize_to_file<B, D>(
    path: impl AsRef<Path>,
    output: Option<&Path>,
    overrides: &DocumentOverrides,
    client: &SummarizationClient<B>,
    decider: D,
    config: &SummaryConfig,
) -> Result<Option<SavedSummary>, SummaryError>
where
    B: CompletionBackend,
    D: DecisionProvider,
{
    let document = load_document(path, overrides, config).await?;
    summarize_document_to_file(&document, output, client, decider, config).await
}

/// [`summarize_document`], then write the Markdown if the run completed.
pub async fn summarize_document_to_file<B, D>(
    document: &Document,
    output: Option<&Path>,
    client: &SummarizationClient<B>,
    decider: D,
    config: &SummaryConfig,
) -> Result<Option<SavedSummary>, SummaryError>
where
    B: CompletionBackend,
    D: DecisionProvider,
{
    let run = match summarize_document(document, client, decider, config).await? {
        ReductionOutcome::Completed(run) => run,
        ReductionOutcome::Aborted { reason, .. } => {
            info!("Run aborted ({:?}); nothing written", reason);
            return Ok(None);
        }
    };

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(document.title()));
    write_markdown(&run.summaries, document.title(), &path, config.max_summary_words).await?;
    Ok(Some(SavedSummary { path, run }))
}

/// Read PDF metadata without extracting text or calling the API.
pub async fn inspect(path: impl AsRef<Path>) -> Result<DocumentMetadata, SummaryError> {
    let pdf_path = input::resolve_local(path)?;
    extract::extract_metadata(&pdf_path).await
}
