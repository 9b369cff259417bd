//! Yes/no confirmation gates.
//!
//! The reducer never talks to the terminal directly; it asks a
//! [`DecisionProvider`]. The CLI plugs in [`ConsoleDecisionProvider`] (or
//! [`AutoApprove`] with `--yes`), tests plug in [`ScriptedDecisionProvider`].

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use tracing::warn;

/// Answers a yes/no question.
pub trait DecisionProvider {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<D: DecisionProvider + ?Sized> DecisionProvider for &mut D {
    fn confirm(&mut self, prompt: &str) -> bool {
        (**self).confirm(prompt)
    }
}

/// Interactive prompt: prints the question, then reads lines until it gets
/// `yes`/`y` or `no`/`n` (case-insensitive).
///
/// End of input or a read error counts as "no".
pub struct ConsoleDecisionProvider<R, W> {
    input: R,
    output: W,
}

impl ConsoleDecisionProvider<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Read from stdin, prompt on stderr (stdout may carry the summary).
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsoleDecisionProvider<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> DecisionProvider for ConsoleDecisionProvider<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        let _ = writeln!(self.output, "{prompt}");
        let _ = self.output.flush();

        loop {
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    warn!("No answer on input (EOF); treating as 'no'");
                    return false;
                }
                Ok(_) => match parse_answer(&line) {
                    Some(answer) => return answer,
                    None => {
                        let _ = writeln!(self.output, "Please respond by yes or no.");
                        let _ = self.output.flush();
                    }
                },
                Err(e) => {
                    warn!("Failed to read answer ({e}); treating as 'no'");
                    return false;
                }
            }
        }
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Answers every question with "yes".
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl DecisionProvider for AutoApprove {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Replays a fixed list of answers and records the prompts it saw.
///
/// Once the script runs out every further question is answered "no".
#[derive(Debug, Default, Clone)]
pub struct ScriptedDecisionProvider {
    answers: VecDeque<bool>,
    prompts: Vec<String>,
}

impl ScriptedDecisionProvider {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl DecisionProvider for ScriptedDecisionProvider {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> ConsoleDecisionProvider<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleDecisionProvider::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn accepts_yes_variants() {
        for input in ["y\n", "Y\n", "yes\n", "YES\n", "  Yes  \n"] {
            assert!(console(input).confirm("Continue? [y/n]"), "{input:?}");
        }
    }

    #[test]
    fn accepts_no_variants() {
        for input in ["n\n", "no\n", "NO\n"] {
            assert!(!console(input).confirm("Continue? [y/n]"), "{input:?}");
        }
    }

    #[test]
    fn reprompts_on_garbage() {
        let mut c = console("maybe\nsure\ny\n");
        assert!(c.confirm("Continue? [y/n]"));
        let shown = String::from_utf8(c.output.clone()).unwrap();
        assert!(shown.starts_with("Continue? [y/n]\n"));
        assert_eq!(shown.matches("Please respond by yes or no.").count(), 2);
    }

    #[test]
    fn eof_is_no() {
        assert!(!console("").confirm("Continue? [y/n]"));
        assert!(!console("what\n").confirm("Continue? [y/n]"));
    }

    #[test]
    fn scripted_replays_then_declines() {
        let mut s = ScriptedDecisionProvider::new([true, false]);
        assert!(s.confirm("first"));
        assert!(!s.confirm("second"));
        assert!(!s.confirm("third"));
        assert_eq!(s.prompts(), ["first", "second", "third"]);
    }

    #[test]
    fn works_through_mut_ref() {
        fn ask<D: DecisionProvider>(mut decider: D) -> bool {
            decider.confirm("q")
        }

        let mut s = ScriptedDecisionProvider::new([true]);
        assert!(ask(&mut s));
        assert_eq!(s.prompts().len(), 1);
    }
}
