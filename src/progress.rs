//! Progress-callback trait for extraction and reduction events.
//!
//! Inject an [`Arc<dyn SummaryProgressCallback>`] via
//! [`crate::config::SummaryConfigBuilder::progress_callback`] to receive
//! events as pages are read and chunks are summarized. The CLI uses this to
//! drive its progress bar; library callers can forward the events anywhere.
//!
//! # Example
//!
//! ```rust
//! use pdf2summary::{SummaryConfig, SummaryProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct ChunkCounter {
//!     chunks: AtomicUsize,
//! }
//!
//! impl SummaryProgressCallback for ChunkCounter {
//!     fn on_chunk_complete(&self, round: usize, chunk: usize, total_chunks: usize) {
//!         self.chunks.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("round {round}: chunk {chunk}/{total_chunks}");
//!     }
//! }
//!
//! let counter = Arc::new(ChunkCounter { chunks: AtomicUsize::new(0) });
//!
//! let config = SummaryConfig::builder()
//!     .progress_callback(counter as Arc<dyn SummaryProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it works through a document.
///
/// Extraction events fire from pdfium's blocking thread, hence `Send +
/// Sync`. All methods default to no-ops.
pub trait SummaryProgressCallback: Send + Sync {
    /// Called once the PDF is open, before the first page is read.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page's text has been read (1-indexed).
    fn on_page_extracted(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called before the first chunk of a reduction round is sent.
    ///
    /// # Arguments
    /// * `round`       1-indexed round number
    /// * `input_words` word count of the text being reduced
    /// * `chunks`      number of completion requests this round will make
    fn on_round_start(&self, round: usize, input_words: usize, chunks: usize) {
        let _ = (round, input_words, chunks);
    }

    /// Called after each chunk summary returns (1-indexed chunk).
    fn on_chunk_complete(&self, round: usize, chunk: usize, total_chunks: usize) {
        let _ = (round, chunk, total_chunks);
    }

    /// Called with the measured word count of the round's output.
    fn on_round_complete(&self, round: usize, output_words: usize) {
        let _ = (round, output_words);
    }

    /// Called once the reduction loop exits.
    fn on_reduction_complete(&self, rounds: usize, shortest_words: usize) {
        let _ = (rounds, shortest_words);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SummaryProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type ProgressCallback = Arc<dyn SummaryProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        pages: AtomicUsize,
        rounds: AtomicUsize,
        chunks: AtomicUsize,
        last_output: AtomicUsize,
    }

    impl SummaryProgressCallback for TrackingCallback {
        fn on_page_extracted(&self, _page_num: usize, _total_pages: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_round_start(&self, _round: usize, _input_words: usize, _chunks: usize) {
            self.rounds.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_complete(&self, _round: usize, _chunk: usize, _total_chunks: usize) {
            self.chunks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_round_complete(&self, _round: usize, output_words: usize) {
            self.last_output.store(output_words, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start(3);
        cb.on_page_extracted(1, 3);
        cb.on_round_start(1, 5000, 5);
        cb.on_chunk_complete(1, 1, 5);
        cb.on_round_complete(1, 1200);
        cb.on_reduction_complete(3, 70);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_page_extracted(1, 2);
        tracker.on_page_extracted(2, 2);
        tracker.on_round_start(1, 2000, 2);
        tracker.on_chunk_complete(1, 1, 2);
        tracker.on_chunk_complete(1, 2, 2);
        tracker.on_round_complete(1, 480);

        assert_eq!(tracker.pages.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.rounds.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.chunks.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.last_output.load(Ordering::SeqCst), 480);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_round_start(1, 10, 1);
        cb.on_chunk_complete(1, 1, 1);
    }
}
