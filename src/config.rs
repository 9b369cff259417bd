//! Configuration for a summarization run.
//!
//! Every knob of the reduction loop lives in [`SummaryConfig`], built via
//! [`SummaryConfigBuilder`]. `build()` rejects values that would make the
//! loop ill-defined (a compression ratio of 1 makes the cost estimate
//! diverge, a chunk length of 0 cannot split anything) and engines that
//! have no price, so a bad configuration fails before any money is spent.
//!
//! Connection settings for the completion API are separate; see
//! [`crate::pipeline::llm::ClientConfig`].

use crate::error::SummaryError;
use crate::pipeline::llm::SUMMARY_PROMPT;
use crate::pricing::PRICING;
use crate::progress::ProgressCallback;
use std::fmt;

/// Configuration for one summarization run.
///
/// # Example
/// ```rust
/// use pdf2summary::SummaryConfig;
///
/// let config = SummaryConfig::builder()
///     .engine("curie")
///     .compression_ratio(0.3)
///     .chunk_length(800)
///     .build()
///     .unwrap();
/// assert_eq!(config.min_summary_length, 80);
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Completion engine; must be in the pricing table. Default: `ada`.
    pub engine: String,

    /// Fraction of each chunk's length requested back as summary. Range
    /// `[0, 1)`. Default: 0.25.
    ///
    /// Also drives the cost estimate: the series `words * (1 + r) / (1 - r)`
    /// grows without bound as `r` approaches 1.
    pub compression_ratio: f64,

    /// Reduction stops once the shortest summary has at most this many
    /// words. Also the floor for each request's `max_tokens`. Default: 80.
    pub min_summary_length: usize,

    /// Words per completion request. Default: 1000.
    pub chunk_length: usize,

    /// Hard cap on reduction rounds. Default: 32.
    ///
    /// Each round should shrink the text by about `compression_ratio`, so a
    /// 100 000-word book reaches 80 words in well under ten rounds. The cap
    /// only matters when the model keeps returning long completions.
    pub max_rounds: usize,

    /// Sampling temperature for chunk summaries. Default: 0.1.
    pub summary_temperature: f32,

    /// Text appended to every chunk. Default: `"\n\nIn summary:"`.
    pub summary_prompt: String,

    /// Ask for a one-word label once reduction finishes. Default: true.
    pub one_word_label: bool,

    /// How many labels may be declined before the run is aborted. Default: 5.
    pub max_label_attempts: usize,

    /// The label is generated from the shortest summary longer than this
    /// many words. Default: 250.
    pub label_source_min_words: usize,

    /// Summaries longer than this are left out of the Markdown file.
    /// Default: 1000.
    pub max_summary_words: usize,

    /// Run the text cleaner over extracted text. Default: true.
    pub clean: bool,

    /// Receives extraction and reduction events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            engine: "ada".to_string(),
            compression_ratio: 0.25,
            min_summary_length: 80,
            chunk_length: 1000,
            max_rounds: 32,
            summary_temperature: 0.1,
            summary_prompt: SUMMARY_PROMPT.to_string(),
            one_word_label: true,
            max_label_attempts: 5,
            label_source_min_words: 250,
            max_summary_words: 1000,
            clean: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("engine", &self.engine)
            .field("compression_ratio", &self.compression_ratio)
            .field("min_summary_length", &self.min_summary_length)
            .field("chunk_length", &self.chunk_length)
            .field("max_rounds", &self.max_rounds)
            .field("summary_temperature", &self.summary_temperature)
            .field("one_word_label", &self.one_word_label)
            .field("max_label_attempts", &self.max_label_attempts)
            .field("max_summary_words", &self.max_summary_words)
            .field("clean", &self.clean)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SummaryProgressCallback>"),
            )
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }

    /// `max_tokens` for a chunk request when the current shortest summary
    /// has `current_words` words.
    pub fn chunk_max_tokens(&self, current_words: usize) -> usize {
        let basis = self.chunk_length.min(current_words) as f64;
        let requested = (basis * self.compression_ratio).floor() as usize;
        requested.max(self.min_summary_length)
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.config.engine = engine.into();
        self
    }

    pub fn compression_ratio(mut self, ratio: f64) -> Self {
        self.config.compression_ratio = ratio;
        self
    }

    pub fn min_summary_length(mut self, words: usize) -> Self {
        self.config.min_summary_length = words;
        self
    }

    pub fn chunk_length(mut self, words: usize) -> Self {
        self.config.chunk_length = words;
        self
    }

    pub fn max_rounds(mut self, n: usize) -> Self {
        self.config.max_rounds = n;
        self
    }

    pub fn summary_temperature(mut self, t: f32) -> Self {
        self.config.summary_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn summary_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.summary_prompt = prompt.into();
        self
    }

    pub fn one_word_label(mut self, v: bool) -> Self {
        self.config.one_word_label = v;
        self
    }

    pub fn max_label_attempts(mut self, n: usize) -> Self {
        self.config.max_label_attempts = n;
        self
    }

    pub fn label_source_min_words(mut self, words: usize) -> Self {
        self.config.label_source_min_words = words;
        self
    }

    pub fn max_summary_words(mut self, words: usize) -> Self {
        self.config.max_summary_words = words;
        self
    }

    pub fn clean(mut self, v: bool) -> Self {
        self.config.clean = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, SummaryError> {
        let c = &self.config;
        if !(0.0..1.0).contains(&c.compression_ratio) {
            return Err(SummaryError::InvalidConfig(format!(
                "compression ratio must be in [0, 1), got {}",
                c.compression_ratio
            )));
        }
        if c.chunk_length == 0 {
            return Err(SummaryError::InvalidConfig(
                "chunk length must be ≥ 1 word".into(),
            ));
        }
        if c.max_rounds == 0 {
            return Err(SummaryError::InvalidConfig(
                "max rounds must be ≥ 1".into(),
            ));
        }
        if c.one_word_label && c.max_label_attempts == 0 {
            return Err(SummaryError::InvalidConfig(
                "max label attempts must be ≥ 1 when the label is enabled".into(),
            ));
        }
        PRICING.price_per_1k(&c.engine)?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = SummaryConfig::builder().build().unwrap();
        assert_eq!(config.engine, "ada");
        assert_eq!(config.compression_ratio, 0.25);
        assert_eq!(config.chunk_length, 1000);
        assert_eq!(config.summary_prompt, "\n\nIn summary:");
        assert!(config.one_word_label);
    }

    #[test]
    fn rejects_ratio_of_one() {
        let err = SummaryConfig::builder().compression_ratio(1.0).build().unwrap_err();
        assert!(matches!(err, SummaryError::InvalidConfig(_)));
        assert!(SummaryConfig::builder().compression_ratio(-0.1).build().is_err());
        assert!(SummaryConfig::builder().compression_ratio(f64::NAN).build().is_err());
    }

    #[test]
    fn rejects_zero_chunk_length() {
        assert!(SummaryConfig::builder().chunk_length(0).build().is_err());
    }

    #[test]
    fn rejects_unknown_engine_before_any_call() {
        let err = SummaryConfig::builder().engine("gpt-4").build().unwrap_err();
        assert!(matches!(err, SummaryError::UnknownEngine { .. }));
    }

    #[test]
    fn zero_label_attempts_ok_when_label_disabled() {
        assert!(SummaryConfig::builder().max_label_attempts(0).build().is_err());
        assert!(SummaryConfig::builder()
            .one_word_label(false)
            .max_label_attempts(0)
            .build()
            .is_ok());
    }

    #[test]
    fn chunk_max_tokens_uses_floor_and_minimum() {
        let config = SummaryConfig::default();
        // min(1000, 5000) * 0.25 = 250
        assert_eq!(config.chunk_max_tokens(5000), 250);
        // min(1000, 500) * 0.25 = 125
        assert_eq!(config.chunk_max_tokens(500), 125);
        // 0.25 * 300 = 75 < 80 → floor at the minimum length
        assert_eq!(config.chunk_max_tokens(300), 80);
        // floor(0.25 * 999) = 249
        assert_eq!(config.chunk_max_tokens(999), 249);
    }

    #[test]
    fn debug_hides_callback() {
        let dbg = format!("{:?}", SummaryConfig::default());
        assert!(dbg.contains("engine"));
        assert!(dbg.contains("progress_callback: None"));
    }
}
