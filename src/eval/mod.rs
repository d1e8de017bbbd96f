//! Evaluator boundary
//!
//! The console front-end treats the language engine as an opaque
//! collaborator: it hands over one accumulated source fragment at a time
//! and receives a classified [`EvalOutcome`] back. Everything the driver
//! needs to know about an evaluation is carried in that result type;
//! exit requests and cancellation travel as ordinary data, never as
//! panics or process exits.

use std::path::PathBuf;

pub mod balance;
pub mod executor;

pub use balance::BalanceEvaluator;
pub use executor::{spawn, CompletionHandle, ExecutorHandle, Interrupter};

/// One or more physical input lines accumulated into a single unit
/// submitted for evaluation.
#[derive(Debug, Clone)]
pub struct SourceFragment {
    text: String,
    start_line: usize,
    end_line: usize,
    origin: Origin,
}

/// Where a fragment's lines came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Typed at the console.
    Interactive,
    /// Read from a script file.
    File(PathBuf),
}

impl SourceFragment {
    /// Start a fragment from its first physical line.
    pub fn new(first_line: &str, line_index: usize, origin: Origin) -> Self {
        Self {
            text: first_line.to_string(),
            start_line: line_index,
            end_line: line_index,
            origin,
        }
    }

    /// Append one more physical line, joined with a newline.
    pub fn push_line(&mut self, line: &str, line_index: usize) {
        debug_assert!(line_index >= self.end_line);
        self.text.push('\n');
        self.text.push_str(line);
        self.end_line = line_index;
    }

    /// The accumulated text, physical lines joined by `\n`.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Origin stamp attached to the fragment when it is handed to the
    /// engine: `<repl>` for interactive input, `path#start-end` for file
    /// input.
    pub fn name(&self) -> String {
        match &self.origin {
            Origin::Interactive => "<repl>".to_string(),
            Origin::File(path) => {
                format!("{}#{}-{}", path.display(), self.start_line, self.end_line)
            }
        }
    }
}

/// Which side of the embedding boundary a stack frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOrigin {
    /// A frame of evaluated user content.
    Guest,
    /// A frame of the execution substrate.
    Host,
}

/// One frame of a failure's stack trace.
#[derive(Debug, Clone)]
pub struct TraceFrame {
    pub origin: FrameOrigin,
    /// Guest frame belonging to the engine's own REPL scaffolding rather
    /// than to the evaluated source.
    pub repl_scaffold: bool,
    pub display: String,
}

impl TraceFrame {
    pub fn guest(display: impl Into<String>) -> Self {
        Self {
            origin: FrameOrigin::Guest,
            repl_scaffold: false,
            display: display.into(),
        }
    }

    pub fn host(display: impl Into<String>) -> Self {
        Self {
            origin: FrameOrigin::Host,
            repl_scaffold: false,
            display: display.into(),
        }
    }

    pub fn scaffold(display: impl Into<String>) -> Self {
        Self {
            origin: FrameOrigin::Guest,
            repl_scaffold: true,
            display: display.into(),
        }
    }
}

/// A structured failure reported by the evaluator.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub frames: Vec<TraceFrame>,
    /// The engine already wrote this failure to the error stream itself;
    /// presenting it again would double-print.
    pub already_emitted: bool,
    /// A native language-level error (as opposed to a cross-boundary
    /// failure); presented without the generic wrapper prefix.
    pub native_guest_error: bool,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frames: Vec::new(),
            already_emitted: false,
            native_guest_error: false,
        }
    }

    pub fn with_frames(mut self, frames: Vec<TraceFrame>) -> Self {
        self.frames = frames;
        self
    }

    pub fn already_emitted(mut self) -> Self {
        self.already_emitted = true;
        self
    }

    pub fn native(mut self) -> Self {
        self.native_guest_error = true;
        self
    }
}

/// Classified result of evaluating one fragment.
#[derive(Debug, Clone)]
pub enum EvalOutcome {
    /// The fragment parsed and ran.
    Completed,
    /// The fragment is syntactically incomplete; more input is needed.
    IncompleteSource,
    /// An in-language quit (or the implicit on-EOF quit) requested
    /// termination with the given status.
    ExitRequested { status: i32 },
    /// A failure originating in the evaluated source.
    GuestFailure(Diagnostic),
    /// A failure originating in the execution substrate.
    HostFailure(Diagnostic),
    /// Cooperative jump-to-top-level; not an error.
    Cancelled,
}

/// The blocking wait for an evaluation was broken by an interrupt
/// (Ctrl-C). The loop swallows this and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// Failure of a console-setting query (echo, prompt).
#[derive(Debug, Clone)]
pub enum QueryFailure {
    /// The query itself tripped an exit request.
    Exit { status: i32 },
    /// Anything else; the loop cannot meaningfully continue without the
    /// setting, so this escapes as an internal error.
    Failed(String),
}

/// Contract between the REPL driver and the language engine.
///
/// One evaluation is in flight at a time; implementations may assume
/// calls are strictly sequential. When an executor is configured the
/// driver talks to [`ExecutorHandle`] instead, which marshals every call
/// onto the dedicated evaluator thread.
pub trait Evaluator {
    /// Evaluate one accumulated fragment.
    fn eval(&mut self, fragment: &SourceFragment) -> Result<EvalOutcome, Interrupted>;

    /// The implicit quit submitted when the input reaches EOF.
    fn on_eof(&mut self) -> EvalOutcome;

    /// Whether prompts and input should be visually reproduced. Read
    /// once per loop iteration; the engine may flip it at runtime.
    fn echo(&mut self) -> Result<bool, QueryFailure>;

    /// The primary prompt string.
    fn prompt(&mut self) -> Result<String, QueryFailure>;

    /// The continuation prompt string.
    fn continue_prompt(&mut self) -> Result<String, QueryFailure>;

    /// Completion candidates for the given buffer and cursor position.
    fn complete(&mut self, _line: &str, _pos: usize) -> Result<Vec<String>, String> {
        Ok(Vec::new())
    }
}

/// Completion source usable from the line editor while the driver owns
/// the evaluator. [`CompletionHandle`] implements this by marshalling
/// onto the evaluator thread.
pub trait Completions: Send + Sync {
    fn complete(&self, line: &str, pos: usize) -> Result<Vec<String>, String>;
}
