//! Word counting and fixed-size word chunking.

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split `text` into chunks of exactly `n` words (the last chunk may be
/// shorter), each re-joined with single spaces.
///
/// # Panics
/// Panics if `n == 0`. [`crate::config::SummaryConfigBuilder::build`] rejects
/// a zero chunk length, so the reducer never reaches this.
pub fn split_into_chunks(text: &str, n: usize) -> Vec<String> {
    assert!(n > 0, "chunk size must be at least one word");

    let words: Vec<&str> = text.split_whitespace().collect();
    words.chunks(n).map(|chunk| chunk.join(" ")).collect()
}
