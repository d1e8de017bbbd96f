//! Batch console
//!
//! A fixed, pre-supplied sequence of lines: decoded `-e` expressions or
//! a script file read fully into memory up front. No prompt is ever
//! rendered and the session is never interactive.

use std::path::PathBuf;

/// The standard scripting front-end escapes spaces to `~+~` in `-e` and
/// `-f` arguments.
pub fn unescape_space(input: &str) -> String {
    input.replace("~+~", " ")
}

pub struct BatchConsole {
    lines: Vec<String>,
    next: usize,
    /// Script path when the lines came from a file.
    source: Option<PathBuf>,
}

impl BatchConsole {
    pub fn from_expressions(expressions: &[String]) -> Self {
        Self {
            lines: expressions.iter().map(|e| unescape_space(e)).collect(),
            next: 0,
            source: None,
        }
    }

    pub fn from_file(path: PathBuf, contents: &str) -> Self {
        Self {
            lines: contents.lines().map(str::to_string).collect(),
            next: 0,
            source: Some(path),
        }
    }

    /// Lines in order, then EOF.
    pub fn read_line(&mut self) -> Option<String> {
        let line = self.lines.get(self.next)?.clone();
        self.next += 1;
        Some(line)
    }

    pub fn current_line_index(&self) -> usize {
        self.next
    }

    pub fn source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }
}
