//! The loaded document: raw extracted text plus its cleaned form.

use crate::pipeline::{chunk, clean};
use serde::{Deserialize, Serialize};

/// Metadata read from the PDF's info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub page_count: usize,
}

/// A document ready for summarization. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    title: String,
    author: String,
    raw_text: String,
    cleaned_text: String,
}

impl Document {
    /// Build a document, cleaning `raw_text` when `clean` is set.
    ///
    /// With `clean = false` the cleaned text is the raw text unchanged.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        raw_text: impl Into<String>,
        clean: bool,
    ) -> Self {
        let raw_text = raw_text.into();
        let cleaned_text = if clean {
            clean::clean_text(&raw_text)
        } else {
            raw_text.clone()
        };
        Self {
            title: title.into(),
            author: author.into(),
            raw_text,
            cleaned_text,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn cleaned_text(&self) -> &str {
        &self.cleaned_text
    }

    /// Word count of the cleaned text.
    pub fn word_count(&self) -> usize {
        chunk::word_count(&self.cleaned_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_on_construction() {
        let doc = Document::new("Pooh", "A. A. Milne", "Chapter 1\n\n\nIn which  we", true);
        assert_eq!(doc.raw_text(), "Chapter 1\n\n\nIn which  we");
        assert_eq!(doc.cleaned_text(), "Chapter \nIn which we");
        assert_eq!(doc.word_count(), 4);
    }

    #[test]
    fn clean_can_be_disabled() {
        let doc = Document::new("t", "", "page 1  text", false);
        assert_eq!(doc.cleaned_text(), "page 1  text");
        assert_eq!(doc.word_count(), 3);
    }
}
