//! Pipeline stages that turn a PDF into text and text into summaries.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ clean ──▶ chunk ──▶ llm
//! (path)    (pdfium)    (regex)   (words)   (completions API)
//! ```
//!
//! 1. [`input`]   validates the path and the `%PDF` magic bytes
//! 2. [`extract`] reads every page's text layer; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`clean`]   strips non-ASCII, digits and repeated whitespace
//! 4. [`chunk`]   counts words and splits text into fixed-size word chunks
//! 5. [`llm`]     the only stage with network I/O

pub mod chunk;
pub mod clean;
pub mod extract;
pub mod input;
pub mod llm;
