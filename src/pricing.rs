//! Engine pricing and cost estimation.
//!
//! A reduction run shrinks the text by roughly `compression_ratio` each
//! round, so the tokens sent across all rounds form a geometric series. The
//! estimate sums that series to infinity:
//!
//! ```text
//! tokens = words * (1 + r) / (1 - r)
//! cost   = tokens * price_per_1k / 1000
//! ```

use crate::error::SummaryError;
use serde::Serialize;

/// Static mapping from engine identifier to USD per 1000 tokens.
#[derive(Debug, Clone, Copy)]
pub struct PricingTable {
    entries: &'static [(&'static str, f64)],
}

/// The process-wide pricing table.
pub static PRICING: PricingTable = PricingTable {
    entries: &[
        ("ada", 0.0008),
        ("babbage", 0.0012),
        ("curie", 0.0060),
        ("davinci", 0.0600),
    ],
};

impl PricingTable {
    /// USD per 1000 tokens for `engine`.
    pub fn price_per_1k(&self, engine: &str) -> Result<f64, SummaryError> {
        self.entries
            .iter()
            .find(|(name, _)| *name == engine)
            .map(|(_, price)| *price)
            .ok_or_else(|| SummaryError::UnknownEngine {
                engine: engine.to_string(),
                known: self.engines().collect::<Vec<_>>().join(", "),
            })
    }

    /// Known engine identifiers, in table order.
    pub fn engines(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn contains(&self, engine: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == engine)
    }
}

/// Result of [`estimate_cost`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub engine: String,
    pub word_count: usize,
    /// Total tokens over all rounds (fractional: it is a series limit).
    pub token_count: f64,
    /// Estimated spend in USD.
    pub cost_usd: f64,
}

/// Estimate the spend of a full reduction run over `word_count` words.
///
/// `compression_ratio` must lie in `[0, 1)`; at exactly 1 the series
/// diverges. [`crate::config::SummaryConfigBuilder::build`] enforces the range.
pub fn estimate_cost(
    word_count: usize,
    compression_ratio: f64,
    engine: &str,
) -> Result<CostEstimate, SummaryError> {
    debug_assert!(
        (0.0..1.0).contains(&compression_ratio),
        "compression ratio must be in [0, 1), got {compression_ratio}"
    );
    let price = PRICING.price_per_1k(engine)?;

    let initial_tokens = word_count as f64 * (1.0 + compression_ratio);
    let token_count = initial_tokens / (1.0 - compression_ratio);

    Ok(CostEstimate {
        engine: engine.to_string(),
        word_count,
        token_count,
        cost_usd: token_count * price / 1000.0,
    })
}

/// Cost of one label request over a `word_count`-word input.
pub fn estimate_label_cost(word_count: usize, engine: &str) -> Result<f64, SummaryError> {
    let price = PRICING.price_per_1k(engine)?;
    Ok(word_count as f64 * price / 1000.0)
}
