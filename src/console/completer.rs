//! Evaluator-driven completion
//!
//! The helper asks the configured [`Completions`] source for candidates
//! given the whole buffer and cursor position, and presents them sorted
//! case-insensitively. A completion failure must never crash the read
//! loop: it is wrapped into a diagnostic I/O error by default, while a
//! test switch lets the raw failure text propagate for unit testing.

use std::io;
use std::sync::Arc;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Helper;

use crate::eval::Completions;

pub struct ReplHelper {
    completions: Option<Arc<dyn Completions>>,
    /// Propagate completion failures verbatim instead of wrapping them.
    raw_failures: bool,
}

impl ReplHelper {
    pub fn new(completions: Option<Arc<dyn Completions>>) -> Self {
        Self { completions, raw_failures: false }
    }

    #[cfg(test)]
    pub fn with_raw_failures(mut self) -> Self {
        self.raw_failures = true;
        self
    }

    fn candidates(&self, line: &str, pos: usize) -> Result<Vec<String>, String> {
        let Some(source) = &self.completions else {
            return Ok(Vec::new());
        };
        let mut candidates = source.complete(line, pos)?;
        candidates.sort_by_key(|c| c.to_lowercase());
        candidates.dedup();
        Ok(candidates)
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Replace the word under the cursor; candidates are full words.
        let start = line[..pos]
            .rfind(|c: char| !c.is_alphanumeric() && c != '_' && c != '.')
            .map_or(0, |i| i + 1);

        match self.candidates(line, pos) {
            Ok(candidates) => {
                // candidates come back in engine case; match the typed
                // word case-insensitively so "pa" still offers "Paste"
                let word = line[start..pos].to_lowercase();
                let pairs = candidates
                    .into_iter()
                    .filter(|c| word.is_empty() || c.to_lowercase().starts_with(&word))
                    .map(|c| Pair { display: c.clone(), replacement: c })
                    .collect();
                Ok((start, pairs))
            }
            Err(e) if self.raw_failures => {
                Err(rustyline::error::ReadlineError::Io(io::Error::other(e)))
            }
            Err(e) => Err(rustyline::error::ReadlineError::Io(io::Error::other(format!(
                "error while determining completion: {e}"
            )))),
        }
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Highlighter for ReplHelper {}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}
