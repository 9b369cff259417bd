//! CLI binary for pdf2summary.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SummaryConfig`, asks the confirmation questions on the terminal and
//! prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2summary::{
    default_output_path, estimate_cost, inspect, load_document, render_markdown,
    summarize_document, write_markdown, AbortReason, AutoApprove, ClientConfig,
    ConsoleDecisionProvider, DecisionProvider, DocumentOverrides, OpenAiCompletions,
    ProgressCallback, ReductionOutcome, ReductionStats, SummarizationClient, SummaryConfig,
    SummaryEntry, SummaryProgressCallback,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

fn bar_style(unit: &str) -> ProgressStyle {
    ProgressStyle::with_template(&format!(
        "{{spinner:.cyan}} {{prefix:.bold}}  [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {unit}  ⏱ {{elapsed_precise}}"
    ))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ")
    .tick_strings(TICKS)
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar, reused: pages while extracting, then chunks for each round.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl SummaryProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.bar.set_style(bar_style("pages"));
        self.bar.set_length(total_pages as u64);
        self.bar.set_position(0);
        self.bar.set_prefix("Extracting");
    }

    fn on_page_extracted(&self, _page_num: usize, _total_pages: usize) {
        self.bar.inc(1);
    }

    fn on_round_start(&self, round: usize, input_words: usize, chunks: usize) {
        self.bar.set_style(bar_style("chunks"));
        self.bar.set_length(chunks as u64);
        self.bar.set_position(0);
        self.bar.set_prefix(format!("Round {round}"));
        self.bar.set_message(format!("{input_words} words"));
    }

    fn on_chunk_complete(&self, _round: usize, _chunk: usize, _total_chunks: usize) {
        self.bar.inc(1);
    }

    fn on_round_complete(&self, round: usize, output_words: usize) {
        self.bar.println(format!(
            "  {} Round {:>2}  {}",
            green("✓"),
            round,
            dim(&format!("{output_words} words")),
        ));
    }

    fn on_reduction_complete(&self, _rounds: usize, _shortest_words: usize) {
        self.bar.finish_and_clear();
    }
}

/// Hides the progress bar while a question is on screen.
struct TerminalDecider {
    inner: Box<dyn DecisionProvider>,
    bar: Option<ProgressBar>,
}

impl DecisionProvider for TerminalDecider {
    fn confirm(&mut self, prompt: &str) -> bool {
        match &self.bar {
            Some(bar) => bar.suspend(|| self.inner.confirm(prompt)),
            None => self.inner.confirm(prompt),
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize, confirming the cost interactively
  pdf2summary book.pdf

  # Pick the output file and a stronger engine
  pdf2summary --engine curie book.pdf -o book-summary.md

  # Unattended run, no one-word label
  pdf2summary --yes --no-label book.pdf

  # What would it cost? (no API key needed)
  pdf2summary --estimate-only book.pdf

  # Inspect PDF metadata (no API key needed)
  pdf2summary --inspect-only book.pdf

  # JSON report on stdout, nothing written to disk
  pdf2summary --json --no-save --yes book.pdf > report.json

ENGINES:
  Engine     $ / 1k tokens
  ───────    ─────────────
  ada        0.0008 (default)
  babbage    0.0012
  curie      0.0060
  davinci    0.0600

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          Completion API key
  PDF2SUMMARY_*           Any option, e.g. PDF2SUMMARY_ENGINE=curie
  PDFIUM_LIB_PATH         Path to an existing libpdfium; skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory
  RUST_LOG                Log filter, overrides -v / -q
"#;

/// Condense a PDF into progressively shorter summaries.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2summary",
    version,
    about = "Condense a PDF into progressively shorter summaries with a text-completion API",
    long_about = "Extract the text of a PDF, clean it, and summarize it round after round \
until it is only a few dozen words long. Every intermediate summary is written to a \
Markdown file. The estimated cost is shown before any request is sent.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Markdown output path [default: summaries/<title>_Summary_<timestamp>.md].
    #[arg(short, long, env = "PDF2SUMMARY_OUTPUT")]
    output: Option<PathBuf>,

    /// Document title [default: PDF metadata, then the file name].
    #[arg(long, env = "PDF2SUMMARY_TITLE")]
    title: Option<String>,

    /// Document author [default: PDF metadata].
    #[arg(long, env = "PDF2SUMMARY_AUTHOR")]
    author: Option<String>,

    /// Completion engine: ada, babbage, curie, davinci.
    #[arg(long, env = "PDF2SUMMARY_ENGINE", default_value = "ada")]
    engine: String,

    /// Fraction of each chunk requested back as summary, in [0, 1).
    #[arg(long, env = "PDF2SUMMARY_COMPRESSION_RATIO", default_value_t = 0.25)]
    compression_ratio: f64,

    /// Stop reducing once a summary has at most this many words.
    #[arg(long, env = "PDF2SUMMARY_MIN_SUMMARY_LENGTH", default_value_t = 80)]
    min_summary_length: usize,

    /// Words per completion request.
    #[arg(long, env = "PDF2SUMMARY_CHUNK_LENGTH", default_value_t = 1000)]
    chunk_length: usize,

    /// Maximum number of reduction rounds.
    #[arg(long, env = "PDF2SUMMARY_MAX_ROUNDS", default_value_t = 32)]
    max_rounds: usize,

    /// Skip the one-word label.
    #[arg(long, env = "PDF2SUMMARY_NO_LABEL")]
    no_label: bool,

    /// Labels that may be declined before the run is aborted.
    #[arg(long, env = "PDF2SUMMARY_LABEL_ATTEMPTS", default_value_t = 5)]
    label_attempts: usize,

    /// Leave summaries longer than this out of the Markdown.
    #[arg(long, env = "PDF2SUMMARY_MAX_SUMMARY_WORDS", default_value_t = 1000)]
    max_summary_words: usize,

    /// Summarize the extracted text as-is, without cleaning.
    #[arg(long, env = "PDF2SUMMARY_NO_CLEAN")]
    no_clean: bool,

    /// Do not write a file; print the Markdown to stdout instead.
    #[arg(long, env = "PDF2SUMMARY_NO_SAVE")]
    no_save: bool,

    /// Print a JSON report (stats and summaries) to stdout.
    #[arg(long, env = "PDF2SUMMARY_JSON")]
    json: bool,

    /// Answer "yes" to every confirmation.
    #[arg(short, long, env = "PDF2SUMMARY_YES")]
    yes: bool,

    /// Completion API base URL.
    #[arg(long, env = "PDF2SUMMARY_BASE_URL", default_value = ClientConfig::DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "PDF2SUMMARY_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Completion API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Print PDF metadata only, no summarization.
    #[arg(long)]
    inspect_only: bool,

    /// Print the cost estimate only, no summarization.
    #[arg(long)]
    estimate_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2SUMMARY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and questions.
    #[arg(short, long, env = "PDF2SUMMARY_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2SUMMARY_NO_PROGRESS")]
    no_progress: bool,
}

/// `--json` output.
#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    author: &'a str,
    output: Option<&'a Path>,
    stats: &'a ReductionStats,
    summaries: Vec<&'a SummaryEntry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would tear through the progress bar; the bar replaces them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    ensure_pdfium(cli.quiet)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:    {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:   {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:  {}", a);
            }
            println!("Pages:   {}", meta.page_count);
        }
        return Ok(());
    }

    // ── Build config & load ──────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let bar = progress.as_ref().map(|cb| cb.bar.clone());
    let config = build_config(&cli, progress.map(|cb| cb as ProgressCallback))?;

    let overrides = DocumentOverrides {
        title: cli.title.clone(),
        author: cli.author.clone(),
    };
    let document = load_document(&cli.input, &overrides, &config)
        .await
        .context("Failed to load PDF")?;

    // ── Estimate-only mode ───────────────────────────────────────────────
    if cli.estimate_only {
        if let Some(ref bar) = bar {
            bar.finish_and_clear();
        }
        let estimate = estimate_cost(document.word_count(), config.compression_ratio, &config.engine)
            .context("Failed to estimate cost")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&estimate).context("Failed to serialize estimate")?
            );
        } else {
            println!("Title:   {}", document.title());
            println!("Words:   {}", estimate.word_count);
            println!("Tokens:  {:.0}", estimate.token_count);
            println!("Cost:    $US {:.3} ({})", estimate.cost_usd, estimate.engine);
        }
        return Ok(());
    }

    // ── Summarize ────────────────────────────────────────────────────────
    let api_key = cli
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .context("No API key: set OPENAI_API_KEY or pass --api-key")?;
    let backend = OpenAiCompletions::new(
        ClientConfig::new(api_key)
            .base_url(cli.base_url.clone())
            .timeout_secs(cli.api_timeout),
    )
    .context("Failed to create completion client")?;
    let client = SummarizationClient::new(backend);

    let decider = TerminalDecider {
        inner: if cli.yes {
            Box::new(AutoApprove)
        } else {
            Box::new(ConsoleDecisionProvider::stdio())
        },
        bar: bar.clone(),
    };

    let outcome = summarize_document(&document, &client, decider, &config)
        .await
        .context("Summarization failed")?;
    if let Some(ref bar) = bar {
        bar.finish_and_clear();
    }

    let run = match outcome {
        ReductionOutcome::Completed(run) => run,
        ReductionOutcome::Aborted { reason, .. } => {
            if !cli.quiet {
                let why = match reason {
                    AbortReason::CostDeclined { .. } => "cost declined".to_string(),
                    AbortReason::LabelDeclined { attempts } => {
                        format!("{attempts} labels declined")
                    }
                };
                eprintln!("{} Aborted ({why}); nothing written", yellow("⚠"));
            }
            return Ok(());
        }
    };

    // ── Output ───────────────────────────────────────────────────────────
    let output_path = if cli.no_save {
        None
    } else {
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(document.title()));
        write_markdown(&run.summaries, document.title(), &path, config.max_summary_words)
            .await
            .context("Failed to write summary")?;
        Some(path)
    };

    if cli.json {
        let report = JsonReport {
            title: document.title(),
            author: document.author(),
            output: output_path.as_deref(),
            stats: &run.stats,
            summaries: run.summaries.iter().collect(),
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if cli.no_save {
        let markdown = render_markdown(&run.summaries, document.title(), config.max_summary_words);
        io::stdout()
            .lock()
            .write_all(markdown.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        let stats = &run.stats;
        if stats.stalled || stats.round_cap_hit {
            eprintln!(
                "{} Reduction stopped early; shortest summary has {} words",
                yellow("⚠"),
                run.summaries
                    .iter()
                    .find(|e| e.round.is_some())
                    .map(|e| e.word_count)
                    .unwrap_or(0)
            );
        }
        eprintln!(
            "{}  {} rounds  {} requests  {}",
            green("✔"),
            stats.rounds,
            stats.requests,
            dim(&format!("est. $US {:.3}", stats.estimate.cost_usd)),
        );
        if let Some(ref path) = output_path {
            eprintln!("   {} {}", cyan("→"), bold(&path.display().to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `SummaryConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .engine(cli.engine.clone())
        .compression_ratio(cli.compression_ratio)
        .min_summary_length(cli.min_summary_length)
        .chunk_length(cli.chunk_length)
        .max_rounds(cli.max_rounds)
        .one_word_label(!cli.no_label)
        .max_label_attempts(cli.label_attempts)
        .max_summary_words(cli.max_summary_words)
        .clean(!cli.no_clean);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Make sure the pdfium shared library is available.
///
/// On the very first run it is downloaded (~30 MB) and cached; later runs
/// only check the cached path.
fn ensure_pdfium(quiet: bool) -> Result<()> {
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }

    if quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length() != Some(t) {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}
