//! # pdf2summary
//!
//! Condense a PDF into progressively shorter summaries with a
//! text-completion API, and write them out as Markdown.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate the local file (exists, readable, %PDF)
//!  ├─ 2. Extract  page text via pdfium (blocking, spawn_blocking)
//!  ├─ 3. Clean    ASCII only, no digits, single spaces and newlines
//!  ├─ 4. Confirm  estimated cost shown to a DecisionProvider
//!  ├─ 5. Reduce   chunk → summarize → concatenate, until ≤ 80 words
//!  ├─ 6. Label    optional one-word summary, confirmed by the user
//!  └─ 7. Output   "# Summary of <title>" with one section per length
//! ```
//!
//! Every round summarizes the current shortest text chunk by chunk and
//! stores the concatenation under its measured word count, so the result is
//! a ladder of summaries: a few thousand words, a few hundred, under a
//! hundred, one.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2summary::{
//!     summarize_to_file, AutoApprove, ClientConfig, DocumentOverrides, OpenAiCompletions,
//!     SummarizationClient, SummaryConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = OpenAiCompletions::new(ClientConfig::new(std::env::var("OPENAI_API_KEY")?))?;
//!     let client = SummarizationClient::new(backend);
//!     let config = SummaryConfig::builder().engine("curie").build()?;
//!
//!     let saved = summarize_to_file(
//!         "book.pdf",
//!         None,
//!         &DocumentOverrides::default(),
//!         &client,
//!         AutoApprove,
//!         &config,
//!     )
//!     .await?;
//!     if let Some(saved) = saved {
//!         eprintln!("{} rounds, written to {}", saved.run.stats.rounds, saved.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2summary` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Engines
//!
//! | Engine | $ / 1k tokens |
//! |--------|---------------|
//! | `ada`     | 0.0008 |
//! | `babbage` | 0.0012 |
//! | `curie`   | 0.0060 |
//! | `davinci` | 0.0600 |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod decision;
pub mod document;
pub mod error;
pub mod markdown;
pub mod pipeline;
pub mod pricing;
pub mod progress;
pub mod reducer;
pub mod summarize;
pub mod summary_set;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SummaryConfig, SummaryConfigBuilder};
pub use decision::{AutoApprove, ConsoleDecisionProvider, DecisionProvider, ScriptedDecisionProvider};
pub use document::{Document, DocumentMetadata};
pub use error::SummaryError;
pub use markdown::{default_output_path, render_markdown, write_markdown};
pub use pipeline::llm::{
    ClientConfig, CompletionBackend, CompletionRequest, OpenAiCompletions, SamplingOptions,
    SummarizationClient,
};
pub use pricing::{estimate_cost, estimate_label_cost, CostEstimate, PRICING};
pub use progress::{NoopProgressCallback, ProgressCallback, SummaryProgressCallback};
pub use reducer::{
    AbortReason, ReducerState, ReductionOutcome, ReductionStats, SummaryReducer, SummaryRun,
};
pub use summarize::{
    inspect, load_document, summarize_document, summarize_document_to_file, summarize_pdf,
    summarize_to_file, DocumentOverrides, PdfSummary, SavedSummary,
};
pub use summary_set::{InsertOutcome, SummaryEntry, SummarySet};
