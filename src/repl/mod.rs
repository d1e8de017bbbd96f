//! Read-eval-print loop
//!
//! The driver is single-threaded and synchronous: it pulls physical
//! lines from the console, accumulates them into a [`SourceFragment`]
//! until the evaluator stops reporting incomplete source, and maps the
//! evaluation outcome onto loop control. Guest and host failures are
//! presented and survived; only an explicit exit request, end of input,
//! or an internal contract violation ends the loop.

use std::io::{self, Write};

use thiserror::Error;
use tracing::debug;

use crate::console::{Console, StdStream};
use crate::eval::{EvalOutcome, Evaluator, Interrupted, QueryFailure, SourceFragment};

mod present;

pub use present::present;

/// Failure of the loop machinery itself, as opposed to a failure of
/// evaluated content. Always fatal.
#[derive(Debug, Error)]
pub enum ReplError {
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Internal(String),
}

pub struct ReplDriver<E: Evaluator> {
    console: Console,
    evaluator: E,
    /// Where presented diagnostics go. An embedded session writes them
    /// through the host's stderr callback, everything else to the
    /// process stderr.
    errors: Box<dyn Write>,
    last_status: i32,
}

impl<E: Evaluator> ReplDriver<E> {
    pub fn new(console: Console, evaluator: E) -> Self {
        let errors: Box<dyn Write> = match &console {
            Console::Embedded(c) => Box::new(c.writer(StdStream::Stderr)),
            _ => Box::new(io::stderr()),
        };
        Self {
            console,
            evaluator,
            errors,
            last_status: 0,
        }
    }

    /// Redirect presented diagnostics to an arbitrary sink.
    pub fn with_error_sink(mut self, sink: impl Write + 'static) -> Self {
        self.errors = Box::new(sink);
        self
    }

    /// Run the loop to completion and return the process exit status.
    pub fn run(mut self) -> Result<i32, ReplError> {
        'outer: loop {
            let echo = match self.evaluator.echo() {
                Ok(echo) => echo,
                Err(QueryFailure::Exit { status }) => return Ok(status),
                Err(QueryFailure::Failed(message)) => return Err(ReplError::Internal(message)),
            };
            let prompt = if echo {
                match self.evaluator.prompt() {
                    Ok(prompt) => Some(prompt),
                    Err(QueryFailure::Exit { status }) => return Ok(status),
                    Err(QueryFailure::Failed(message)) => {
                        return Err(ReplError::Internal(message))
                    }
                }
            } else {
                None
            };
            self.console.set_prompt(prompt);

            let Some(line) = self.console.read_line()? else {
                match self.quit_on_eof()? {
                    Some(status) => return Ok(status),
                    None => continue 'outer,
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fragment = SourceFragment::new(
                &line,
                self.console.current_line_index(),
                self.console.origin(),
            );
            // computed at most once per fragment, and only when echoing
            let mut continuation: Option<Option<String>> = None;

            loop {
                let prior_status = self.last_status;
                self.last_status = 0;
                let outcome = match self.evaluator.eval(&fragment) {
                    Ok(outcome) => outcome,
                    Err(Interrupted) => {
                        // Ctrl-C during evaluation; drop the fragment,
                        // leave the status as it was
                        self.last_status = prior_status;
                        continue 'outer;
                    }
                };
                match outcome {
                    EvalOutcome::IncompleteSource => {
                        let prompt = match &continuation {
                            Some(prompt) => prompt.clone(),
                            None => {
                                let prompt = if echo {
                                    match self.evaluator.continue_prompt() {
                                        Ok(prompt) => Some(prompt),
                                        Err(QueryFailure::Exit { status }) => {
                                            return Ok(status)
                                        }
                                        Err(QueryFailure::Failed(message)) => {
                                            return Err(ReplError::Internal(message))
                                        }
                                    }
                                } else {
                                    None
                                };
                                continuation = Some(prompt.clone());
                                prompt
                            }
                        };
                        self.console.set_prompt(prompt);
                        match self.console.read_line()? {
                            Some(next) => {
                                fragment.push_line(&next, self.console.current_line_index());
                                // the whole accumulated fragment is
                                // resubmitted, never just the delta
                            }
                            None => match self.quit_on_eof()? {
                                Some(status) => return Ok(status),
                                None => continue 'outer,
                            },
                        }
                    }
                    EvalOutcome::Completed => continue 'outer,
                    EvalOutcome::ExitRequested { status } => {
                        debug!(status, "exit requested");
                        return Ok(status);
                    }
                    EvalOutcome::GuestFailure(diagnostic)
                    | EvalOutcome::HostFailure(diagnostic) => {
                        present(&diagnostic, &mut self.errors)?;
                        self.errors.flush()?;
                        self.last_status = 1;
                        continue 'outer;
                    }
                    EvalOutcome::Cancelled => continue 'outer,
                }
            }
        }
    }

    /// Submit the implicit quit after the input ran dry. `Some(status)`
    /// ends the loop; `None` means the quit was cooperatively cancelled
    /// and the loop resumes.
    fn quit_on_eof(&mut self) -> Result<Option<i32>, ReplError> {
        match self.evaluator.on_eof() {
            EvalOutcome::ExitRequested { status } => {
                // an EOF-triggered quit must not mask a real error code
                // from the last executed statement
                if status == 0 && self.last_status != 0 {
                    Ok(Some(self.last_status))
                } else {
                    Ok(Some(status))
                }
            }
            EvalOutcome::Cancelled => Ok(None),
            EvalOutcome::GuestFailure(diagnostic) | EvalOutcome::HostFailure(diagnostic) => {
                present(&diagnostic, &mut self.errors)?;
                self.errors.flush()?;
                Err(ReplError::Internal("error while calling quit".to_string()))
            }
            EvalOutcome::Completed | EvalOutcome::IncompleteSource => Ok(Some(self.last_status)),
        }
    }
}

/// Write the last-resort message for an error that escaped the loop's
/// own taxonomy.
pub fn report_unexpected(error: &ReplError) {
    let mut err = io::stderr().lock();
    let _ = writeln!(err, "Unexpected error in REPL");
    let _ = writeln!(err, "{error}");
}
