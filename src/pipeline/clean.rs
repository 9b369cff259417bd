//! Text cleaning: normalise raw pdfium output before word counting.
//!
//! ## Rule Order
//!
//! 1. Drop every character outside 7-bit ASCII
//! 2. Collapse runs of spaces to one space
//! 3. Delete digits outright (no separator is inserted, so `page1text`
//!    becomes `pagetext`; page numbers glued to words disappear the same way)
//! 4. Collapse runs of newlines to one newline
//!
//! Deleting a digit that stood between two spaces leaves a double space, so
//! rule 2 runs again after rule 3. Without that second pass the output could
//! still hold two consecutive spaces and cleaning would not be idempotent.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());
static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
static RE_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// Apply all cleaning rules. Empty input yields an empty string.
pub fn clean_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let s = strip_non_ascii(input);
    let s = collapse_spaces(&s);
    let s = remove_digits(&s);
    let s = collapse_spaces(&s);
    let s = collapse_newlines(&s);

    debug!("Cleaned text: {} → {} bytes", input.len(), s.len());
    s
}

fn strip_non_ascii(input: &str) -> String {
    input.chars().filter(char::is_ascii).collect()
}

fn collapse_spaces(input: &str) -> String {
    RE_SPACES.replace_all(input, " ").into_owned()
}

fn remove_digits(input: &str) -> String {
    RE_DIGITS.replace_all(input, "").into_owned()
}

fn collapse_newlines(input: &str) -> String {
    RE_NEWLINES.replace_all(input, "\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_clean_invariants(out: &str) {
        assert!(out.is_ascii(), "non-ASCII survived: {out:?}");
        assert!(!out.contains("  "), "double space survived: {out:?}");
        assert!(!out.contains("\n\n"), "double newline survived: {out:?}");
        assert!(
            !out.chars().any(|c| c.is_ascii_digit()),
            "digit survived: {out:?}"
        );
    }

    #[test]
    fn empty_is_empty() {
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn strips_unicode() {
        assert_eq!(clean_text("caf\u{e9} na\u{ef}ve \u{201c}q\u{201d}"), "caf nave q");
    }

    #[test]
    fn collapses_spaces_but_not_tabs() {
        assert_eq!(clean_text("a    b\t\tc"), "a b\t\tc");
    }

    #[test]
    fn digits_are_deleted_without_separator() {
        assert_eq!(clean_text("page1text"), "pagetext");
        assert_eq!(clean_text("Chapter 12 begins"), "Chapter begins");
    }

    #[test]
    fn collapses_blank_lines() {
        assert_eq!(clean_text("one\n\n\n\ntwo\nthree"), "one\ntwo\nthree");
    }

    #[test]
    fn page_number_lines_collapse() {
        // A bare page number between paragraphs leaves only blank lines behind.
        assert_eq!(clean_text("end of page\n42\nnext page"), "end of page\nnext page");
    }

    #[test]
    fn invariants_hold_on_awkward_inputs() {
        let inputs = [
            "a 1 b",
            "  leading and trailing  ",
            "x \u{2014} y",
            "1 2 3 4 5",
            "\n\n\n",
            "mixed 9\n\n 8 \u{fffd}\n\nend",
            "\u{feff}BOM then text 2024",
        ];
        for input in inputs {
            assert_clean_invariants(&clean_text(input));
        }
    }

    #[test]
    fn cleaning_is_idempotent() {
        let inputs = [
            "a 1 b",
            "Winnie-the-Pooh  \u{2019}s  page 17\n\n\nChapter 2",
            "  x  ",
            "",
            "plain text",
        ];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "input: {input:?}");
        }
    }
}
