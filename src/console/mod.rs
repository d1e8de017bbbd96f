//! Console abstraction
//!
//! One closed enum over the ways a session can obtain its next line of
//! input: an editing terminal, a plain stdin reader, a pre-supplied list
//! of lines, or an embedding host's callbacks. Behavior differences
//! (prompt suppression, interactivity, completion availability) are
//! matched exhaustively here rather than dispatched through a trait
//! object.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::eval::Completions;
use crate::startup::{ConfigurationError, StartupParams};
use crate::util::config::ReplSettings;

pub mod batch;
pub mod completer;
pub mod embedded;
pub mod interactive;

pub use batch::{unescape_space, BatchConsole};
pub use embedded::{EmbeddedConsole, HostCallbacks, HostWriter, StdStream};
pub use interactive::{InteractiveConsole, PlainConsole};

/// The line source for one session.
pub enum Console {
    /// Editing terminal with history and completion.
    Interactive(InteractiveConsole),
    /// Plain stdin reader (`--no-readline`): prompts are printed, no
    /// history, no completion.
    Plain(PlainConsole),
    /// Fixed list of lines from `-e` expressions or a script file.
    Batch(BatchConsole),
    /// Host-callback console with a lazily built delegate.
    Embedded(EmbeddedConsole),
}

impl Console {
    /// Read the next line. `Ok(None)` is end of input. On the
    /// interactive console Ctrl-C yields an empty line, not EOF.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        match self {
            Console::Interactive(c) => c.read_line(),
            Console::Plain(c) => c.read_line(),
            Console::Batch(c) => Ok(c.read_line()),
            Console::Embedded(c) => c.read_line(),
        }
    }

    /// 1-based index of the most recently read physical line (0 before
    /// any read).
    pub fn current_line_index(&self) -> usize {
        match self {
            Console::Interactive(c) => c.current_line_index(),
            Console::Plain(c) => c.current_line_index(),
            Console::Batch(c) => c.current_line_index(),
            Console::Embedded(c) => c.current_line_index(),
        }
    }

    /// Set the prompt for the next read; `None` suppresses it. The batch
    /// console never renders a prompt, so the setter is a no-op there.
    pub fn set_prompt(&mut self, prompt: Option<String>) {
        match self {
            Console::Interactive(c) => c.set_prompt(prompt),
            Console::Plain(c) => c.set_prompt(prompt),
            Console::Batch(_) => {}
            Console::Embedded(c) => c.set_prompt(prompt),
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            Console::Interactive(c) => c.prompt(),
            Console::Plain(c) => c.prompt(),
            Console::Batch(_) => None,
            Console::Embedded(c) => c.prompt(),
        }
    }

    /// Origin stamped onto fragments built from this console's lines.
    pub fn origin(&self) -> crate::eval::Origin {
        match self {
            Console::Batch(c) => match c.source() {
                Some(path) => crate::eval::Origin::File(path.clone()),
                None => crate::eval::Origin::Interactive,
            },
            _ => crate::eval::Origin::Interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        match self {
            Console::Interactive(_) | Console::Plain(_) => true,
            Console::Batch(_) => false,
            Console::Embedded(c) => c.is_interactive(),
        }
    }
}

/// Expand a leading `~` to the user's home directory. Harmless when the
/// path has no `~`.
fn expand_home(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    if let Some(rest) = s.strip_prefix('~') {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(format!("{}{}", home.to_string_lossy(), rest));
        }
    }
    path.to_path_buf()
}

/// Select and construct the console for a session.
///
/// Whether input comes from stdin, a file (`-f`) or command-line
/// expressions (`-e`), it goes through a console; `-f` and `-e` together
/// were already rejected at derivation time. The ambiguous-save check
/// lives here, not in the option parser, because interactivity can
/// depend on TTY detection done by the caller.
pub fn create_console(
    params: &StartupParams,
    settings: &ReplSettings,
    completions: Option<Arc<dyn Completions>>,
) -> Result<Console, ConfigurationError> {
    if let Some(file) = &params.file {
        let path = expand_home(file);
        let lines = std::fs::read_to_string(&path).map_err(|_| {
            ConfigurationError::CannotOpenFile { path: file.display().to_string() }
        })?;
        return Ok(Console::Batch(BatchConsole::from_file(path, &lines)));
    }
    if !params.expressions.is_empty() {
        return Ok(Console::Batch(BatchConsole::from_expressions(&params.expressions)));
    }
    if !params.interactive && params.ask_for_save {
        return Err(ConfigurationError::AmbiguousSavePolicy);
    }
    if params.no_readline {
        Ok(Console::Plain(PlainConsole::new()))
    } else {
        let console = InteractiveConsole::new(settings, completions)
            .map_err(|e| ConfigurationError::Terminal(e.to_string()))?;
        Ok(Console::Interactive(console))
    }
}

/// Embedded-mode console construction. The real delegate is built only
/// on first use so that a redirected stdin is never touched eagerly; a
/// host that overrides the read callback may never build it at all.
pub fn create_embedded_console(
    params: &StartupParams,
    settings: &ReplSettings,
    callbacks: HostCallbacks,
) -> Result<Console, ConfigurationError> {
    if !params.interactive && params.ask_for_save && params.file.is_none()
        && params.expressions.is_empty()
    {
        return Err(ConfigurationError::AmbiguousSavePolicy);
    }
    let interactive = params.interactive;
    let params = params.clone();
    let settings = settings.clone();
    let factory = move || create_console(&params, &settings, None);
    Ok(Console::Embedded(EmbeddedConsole::new(callbacks, interactive, factory)))
}
