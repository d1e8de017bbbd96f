//! Interactive consoles
//!
//! [`InteractiveConsole`] wraps a rustyline editor with persistent
//! history and evaluator-driven completion. [`PlainConsole`] is the
//! `--no-readline` fallback: prompts printed by hand, lines read
//! straight off stdin.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{CompletionType, EditMode, Editor};
use tracing::debug;

use crate::console::completer::ReplHelper;
use crate::eval::Completions;
use crate::util::config::ReplSettings;

/// Terminal console backed by rustyline.
pub struct InteractiveConsole {
    editor: Editor<ReplHelper, FileHistory>,
    history_file: Option<PathBuf>,
    prompt: Option<String>,
    lines_read: usize,
}

impl InteractiveConsole {
    pub fn new(
        settings: &ReplSettings,
        completions: Option<Arc<dyn Completions>>,
    ) -> rustyline::Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(if settings.vi_mode { EditMode::Vi } else { EditMode::Emacs })
            .max_history_size(settings.history_size)?
            .build();

        let mut editor: Editor<ReplHelper, FileHistory> = Editor::with_config(config)?;
        editor.set_helper(Some(ReplHelper::new(completions)));

        let history_file = settings.resolved_history_file();
        if let Some(path) = &history_file {
            if path.exists() {
                if let Err(e) = editor.load_history(path) {
                    debug!("could not load history from {}: {e}", path.display());
                }
            }
        }

        Ok(Self { editor, history_file, prompt: None, lines_read: 0 })
    }

    /// Ctrl-C yields an empty line so the loop treats it as "nothing to
    /// parse, ask again"; Ctrl-D (or stream close) is EOF.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let prompt = self.prompt.as_deref().unwrap_or("");
        match self.editor.readline(prompt) {
            Ok(line) => {
                self.lines_read += 1;
                let _ = self.editor.add_history_entry(&line);
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => {
                self.lines_read += 1;
                Ok(Some(String::new()))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e.to_string())),
        }
    }

    pub fn current_line_index(&self) -> usize {
        self.lines_read
    }

    pub fn set_prompt(&mut self, prompt: Option<String>) {
        self.prompt = prompt;
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }
}

impl Drop for InteractiveConsole {
    fn drop(&mut self) {
        if let Some(path) = &self.history_file {
            if let Err(e) = self.editor.save_history(path) {
                debug!("could not save history to {}: {e}", path.display());
            }
        }
    }
}

/// Stdin console without line editing (`--no-readline`).
pub struct PlainConsole {
    prompt: Option<String>,
    lines_read: usize,
}

impl PlainConsole {
    pub fn new() -> Self {
        Self { prompt: None, lines_read: 0 }
    }

    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        if let Some(prompt) = &self.prompt {
            let mut out = io::stdout().lock();
            out.write_all(prompt.as_bytes())?;
            out.flush()?;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    pub fn current_line_index(&self) -> usize {
        self.lines_read
    }

    pub fn set_prompt(&mut self, prompt: Option<String>) {
        self.prompt = prompt;
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }
}

impl Default for PlainConsole {
    fn default() -> Self {
        Self::new()
    }
}
