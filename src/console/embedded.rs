//! Embedding adapter
//!
//! An embedding application may override console I/O with its own
//! callbacks. Reads and writes first enter a shared execution context (a
//! mutex, since the host may call in from a different thread than the
//! one driving the loop); the guard releases it on every exit path.
//! When a callback is absent the operation falls through to a real
//! console delegate that is built lazily on first use, so a redirected
//! stdin is never opened eagerly.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::console::Console;
use crate::startup::ConfigurationError;

/// Host-supplied I/O overrides. Presence of a callback is the override
/// signal; read and write are checked independently, per call.
#[derive(Default)]
pub struct HostCallbacks {
    /// Given the current prompt, return a line or `None` for EOF.
    pub read_line: Option<Box<dyn FnMut(&str) -> Option<String> + Send>>,
    pub write_stdout: Option<Box<dyn FnMut(&[u8]) + Send>>,
    pub write_stderr: Option<Box<dyn FnMut(&[u8]) + Send>>,
}

type DelegateFactory = Box<dyn FnOnce() -> Result<Console, ConfigurationError> + Send>;

enum Delegate {
    Uninitialized(DelegateFactory),
    Initialized(Box<Console>),
    /// The factory failed once; it will not be retried.
    Failed(String),
}

struct State {
    callbacks: HostCallbacks,
    delegate: Delegate,
}

/// The shared execution context serializing host-thread callbacks and
/// driver-thread operations.
struct Shared {
    state: Mutex<State>,
}

/// Which default stream a [`HostWriter`] drains to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdStream {
    Stdout,
    Stderr,
}

pub struct EmbeddedConsole {
    shared: Arc<Shared>,
    interactive: bool,
    prompt: Option<String>,
    lines_read: usize,
}

impl EmbeddedConsole {
    pub fn new<F>(callbacks: HostCallbacks, interactive: bool, factory: F) -> Self
    where
        F: FnOnce() -> Result<Console, ConfigurationError> + Send + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    callbacks,
                    delegate: Delegate::Uninitialized(Box::new(factory)),
                }),
            }),
            interactive,
            prompt: None,
            lines_read: 0,
        }
    }

    /// A buffered writer draining to the host's write callback for the
    /// given stream, or to the real stream when no callback is set.
    pub fn writer(&self, stream: StdStream) -> HostWriter {
        HostWriter { shared: Arc::clone(&self.shared), stream, buf: Vec::with_capacity(BUF_SIZE) }
    }

    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let prompt = self.prompt.clone().unwrap_or_default();
        let mut state = self.shared.state.lock();
        // callback presence is re-checked on every call
        let line = if let Some(read) = state.callbacks.read_line.as_mut() {
            read(&prompt)
        } else {
            let delegate = get_or_create(&mut state.delegate)?;
            delegate.set_prompt(self.prompt.clone());
            delegate.read_line()?
        };
        drop(state);
        if line.is_some() {
            self.lines_read += 1;
        }
        Ok(line)
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

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

fn get_or_create(delegate: &mut Delegate) -> io::Result<&mut Console> {
    if let Delegate::Uninitialized(_) = delegate {
        let factory = match std::mem::replace(
            delegate,
            Delegate::Failed("console delegate factory did not run".to_string()),
        ) {
            Delegate::Uninitialized(factory) => factory,
            _ => unreachable!(),
        };
        match factory() {
            Ok(console) => *delegate = Delegate::Initialized(Box::new(console)),
            Err(e) => *delegate = Delegate::Failed(e.to_string()),
        }
    }
    match delegate {
        Delegate::Initialized(console) => Ok(console),
        Delegate::Failed(message) => Err(io::Error::other(message.clone())),
        Delegate::Uninitialized(_) => unreachable!(),
    }
}

const BUF_SIZE: usize = 128;

/// Output writer with a small fixed buffer, flushed to the host callback
/// or the default stream. Entering the shared context happens per flush,
/// not per byte.
pub struct HostWriter {
    shared: Arc<Shared>,
    stream: StdStream,
    buf: Vec<u8>,
}

impl Write for HostWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        for chunk in data.chunks(BUF_SIZE) {
            if self.buf.len() + chunk.len() > BUF_SIZE {
                self.flush()?;
            }
            self.buf.extend_from_slice(chunk);
            written += chunk.len();
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let mut state = self.shared.state.lock();
        let callback = match self.stream {
            StdStream::Stdout => state.callbacks.write_stdout.as_mut(),
            StdStream::Stderr => state.callbacks.write_stderr.as_mut(),
        };
        if let Some(write) = callback {
            write(&self.buf);
        } else {
            match self.stream {
                StdStream::Stdout => io::stdout().write_all(&self.buf)?,
                StdStream::Stderr => io::stderr().write_all(&self.buf)?,
            }
        }
        self.buf.clear();
        Ok(())
    }
}

impl Drop for HostWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
