//! The reduction loop: shrink a text round by round until it is short enough.
//!
//! ## State Machine
//!
//! ```text
//! Init ──▶ AwaitingCostConfirmation ──▶ Reducing ──▶ AwaitingLabelConfirmation ──▶ Done
//!                    │                                          │
//!                    └──────────────── Aborted ◀────────────────┘
//! ```
//!
//! * **Init** seeds the [`SummarySet`] with the whole text.
//! * **AwaitingCostConfirmation** prices the run and asks the
//!   [`DecisionProvider`]. "No" aborts before any request is sent.
//! * **Reducing** takes the shortest summary, splits it into chunks,
//!   summarizes every chunk in order and stores the concatenation under its
//!   measured word count. Repeats until the shortest summary has at most
//!   `min_summary_length` words.
//! * **AwaitingLabelConfirmation** (optional) proposes one-word labels until
//!   one is accepted or `max_label_attempts` run out (→ Aborted).
//!
//! A round whose output is not shorter than its input ends the reduction
//! phase: feeding the same text back would never converge. `max_rounds` caps
//! the loop independently.

use crate::config::SummaryConfig;
use crate::decision::DecisionProvider;
use crate::error::SummaryError;
use crate::pipeline::chunk::split_into_chunks;
use crate::pipeline::llm::{CompletionBackend, SummarizationClient};
use crate::pricing::{estimate_cost, estimate_label_cost, CostEstimate};
use crate::summary_set::{InsertOutcome, SummarySet};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Where the reducer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReducerState {
    Init,
    AwaitingCostConfirmation,
    Reducing,
    AwaitingLabelConfirmation,
    Done,
    Aborted,
}

impl fmt::Display for ReducerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReducerState::Init => "init",
            ReducerState::AwaitingCostConfirmation => "awaiting-cost-confirmation",
            ReducerState::Reducing => "reducing",
            ReducerState::AwaitingLabelConfirmation => "awaiting-label-confirmation",
            ReducerState::Done => "done",
            ReducerState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Why a run ended in [`ReducerState::Aborted`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AbortReason {
    /// The cost estimate was declined; no request was sent.
    CostDeclined { estimate: CostEstimate },
    /// Every proposed label was declined.
    LabelDeclined { attempts: usize },
}

/// Counters for a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReductionStats {
    pub estimate: CostEstimate,
    /// Reduction rounds executed.
    pub rounds: usize,
    /// Completion requests sent, labels included.
    pub requests: usize,
    /// A round failed to shrink its input.
    pub stalled: bool,
    /// `max_rounds` was reached while still above `min_summary_length`.
    pub round_cap_hit: bool,
    /// Labels proposed (0 when the label step was skipped or disabled).
    pub label_attempts: usize,
}

/// A completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRun {
    pub summaries: SummarySet,
    pub stats: ReductionStats,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum ReductionOutcome {
    Completed(SummaryRun),
    /// Declined by the user. `summaries` holds whatever was produced
    /// before the decline; callers must not persist it.
    Aborted {
        reason: AbortReason,
        summaries: SummarySet,
    },
}

enum LabelStep {
    Accepted,
    Skipped,
    Declined { attempts: usize },
}

/// Drives one reduction run.
pub struct SummaryReducer<'a, B, D> {
    client: &'a SummarizationClient<B>,
    decider: D,
    config: &'a SummaryConfig,
    state: ReducerState,
    summaries: SummarySet,
}

impl<'a, B: CompletionBackend, D: DecisionProvider> SummaryReducer<'a, B, D> {
    pub fn new(client: &'a SummarizationClient<B>, decider: D, config: &'a SummaryConfig) -> Self {
        Self {
            client,
            decider,
            config,
            state: ReducerState::Init,
            summaries: SummarySet::new(),
        }
    }

    pub fn state(&self) -> ReducerState {
        self.state
    }

    /// Run the whole state machine over `text`.
    ///
    /// Returns `Err` on the first failed request; nothing produced so far is
    /// kept in that case.
    pub async fn run(&mut self, text: &str) -> Result<ReductionOutcome, SummaryError> {
        self.transition(ReducerState::Init);
        self.summaries = SummarySet::new();
        let source_words = self.summaries.insert(text, 0).word_count();
        info!("Word count: {}", source_words);

        self.transition(ReducerState::AwaitingCostConfirmation);
        let estimate = estimate_cost(
            source_words,
            self.config.compression_ratio,
            &self.config.engine,
        )?;
        let prompt = format!(
            "Summary cost using engine {}: $US {:.3}. Continue? [y/n]",
            self.config.engine, estimate.cost_usd
        );
        if !self.decider.confirm(&prompt) {
            info!("Cost estimate declined; aborting");
            return Ok(self.abort(AbortReason::CostDeclined { estimate }));
        }

        self.transition(ReducerState::Reducing);
        let mut stats = ReductionStats {
            estimate,
            rounds: 0,
            requests: 0,
            stalled: false,
            round_cap_hit: false,
            label_attempts: 0,
        };
        self.reduce(&mut stats).await?;

        if self.config.one_word_label {
            match self.label(&mut stats).await? {
                LabelStep::Accepted | LabelStep::Skipped => {}
                LabelStep::Declined { attempts } => {
                    info!("All {} labels declined; aborting", attempts);
                    return Ok(self.abort(AbortReason::LabelDeclined { attempts }));
                }
            }
        }

        self.transition(ReducerState::Done);
        info!("Finished generating summaries");
        Ok(ReductionOutcome::Completed(SummaryRun {
            summaries: std::mem::take(&mut self.summaries),
            stats,
        }))
    }

    async fn reduce(&mut self, stats: &mut ReductionStats) -> Result<(), SummaryError> {
        let config = self.config;
        let progress = config.progress_callback.as_ref();

        loop {
            let Some(shortest) = self.summaries.shortest() else {
                break;
            };
            let current = shortest.word_count;
            if current <= config.min_summary_length {
                break;
            }
            if stats.rounds >= config.max_rounds {
                warn!(
                    "Stopping after {} rounds with {} words left (limit reached)",
                    stats.rounds, current
                );
                stats.round_cap_hit = true;
                break;
            }

            let round = stats.rounds + 1;
            let chunks = split_into_chunks(&shortest.text, config.chunk_length);
            let max_tokens = config.chunk_max_tokens(current);
            debug!(
                "Round {}: {} words in {} chunks, max_tokens = {}",
                round,
                current,
                chunks.len(),
                max_tokens
            );
            if let Some(cb) = progress {
                cb.on_round_start(round, current, chunks.len());
            }

            let mut combined = String::new();
            for (i, chunk) in chunks.iter().enumerate() {
                let summary = self
                    .client
                    .summarize(
                        chunk,
                        &config.engine,
                        &config.summary_prompt,
                        max_tokens,
                        config.summary_temperature,
                    )
                    .await?;
                stats.requests += 1;
                combined.push_str(&summary);
                if let Some(cb) = progress {
                    cb.on_chunk_complete(round, i + 1, chunks.len());
                }
            }

            stats.rounds = round;
            let produced = match self.summaries.insert(combined, round) {
                InsertOutcome::Added { word_count } => word_count,
                InsertOutcome::Replaced { word_count, .. } => {
                    debug!("Round {} replaced the existing {}-word summary", round, word_count);
                    word_count
                }
            };
            info!("Generated summary of length {}", produced);
            if let Some(cb) = progress {
                cb.on_round_complete(round, produced);
            }

            if produced >= current {
                warn!(
                    "Round {} did not shrink the text ({} → {} words); stopping reduction",
                    round, current, produced
                );
                stats.stalled = true;
                break;
            }
        }

        if let Some(cb) = progress {
            cb.on_reduction_complete(stats.rounds, self.summaries.min_key().unwrap_or(0));
        }
        Ok(())
    }

    async fn label(&mut self, stats: &mut ReductionStats) -> Result<LabelStep, SummaryError> {
        let config = self.config;
        let Some(source) = self.summaries.shortest_above(config.label_source_min_words) else {
            info!(
                "No summary longer than {} words; skipping one-word label",
                config.label_source_min_words
            );
            return Ok(LabelStep::Skipped);
        };
        let source_words = source.word_count;
        let source_text = source.text.clone();
        let cost = estimate_label_cost(source_words, &config.engine)?;

        self.transition(ReducerState::AwaitingLabelConfirmation);
        for attempt in 1..=config.max_label_attempts {
            let label = self
                .client
                .one_word_label(&source_text, &config.engine)
                .await?;
            stats.requests += 1;
            stats.label_attempts = attempt;

            let prompt = format!(
                "Accept '{}' as one-word summary (new estimate costs $US {:.4})? [y/n]",
                label, cost
            );
            if self.decider.confirm(&prompt) {
                self.summaries.insert_label(label);
                return Ok(LabelStep::Accepted);
            }
            debug!(
                "Label {:?} declined ({}/{})",
                label, attempt, config.max_label_attempts
            );
        }

        Ok(LabelStep::Declined {
            attempts: config.max_label_attempts,
        })
    }

    fn abort(&mut self, reason: AbortReason) -> ReductionOutcome {
        self.transition(ReducerState::Aborted);
        ReductionOutcome::Aborted {
            reason,
            summaries: std::mem::take(&mut self.summaries),
        }
    }

    fn transition(&mut self, next: ReducerState) {
        debug!("Reducer: {} → {}", self.state, next);
        self.state = next;
    }
}
