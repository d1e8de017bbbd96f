//! Dedicated evaluator thread
//!
//! Engine state must only ever be touched from one designated thread,
//! while line editing and host callbacks run on the invoking thread. The
//! executor owns the evaluator on a single worker (built there via the
//! factory, never moved); every interaction is one marshalled unit of
//! work and the submitting thread blocks on its reply. Submissions are
//! strictly sequential: a new fragment is never sent while a previous
//! reply is outstanding, and a reply orphaned by an interrupt is drained
//! before the next submission.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::debug;

use super::{
    Completions, Diagnostic, EvalOutcome, Evaluator, Interrupted, QueryFailure, SourceFragment,
};

enum Request {
    Eval(SourceFragment),
    OnEof,
    Echo,
    Prompt,
    ContinuePrompt,
    Complete { line: String, pos: usize },
}

enum Reply {
    Outcome(EvalOutcome),
    Echo(Result<bool, QueryFailure>),
    Text(Result<String, QueryFailure>),
    Completions(Result<Vec<String>, String>),
}

struct Job {
    request: Request,
    reply: Sender<Reply>,
}

/// How often a blocked submitter rechecks the interrupt flag.
const INTERRUPT_POLL: Duration = Duration::from_millis(25);

/// Cooperative interrupt trigger for a blocked [`ExecutorHandle`].
#[derive(Clone)]
pub struct Interrupter(Arc<AtomicBool>);

impl Interrupter {
    /// Break the handle's current blocking wait; the driver swallows the
    /// resulting [`Interrupted`] and continues its loop.
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Handle through which the driver talks to the evaluator thread.
/// Implements [`Evaluator`], so the driver does not know whether it is
/// calling the engine directly or through the worker.
pub struct ExecutorHandle {
    jobs: Sender<Job>,
    interrupt: Arc<AtomicBool>,
    /// Reply channel abandoned by an interrupted wait.
    stale: Option<Receiver<Reply>>,
}

/// Spawn the evaluator thread. The evaluator is constructed on the
/// worker so its state never crosses threads. Fails only when the OS
/// refuses to create the thread.
pub fn spawn<E, F>(factory: F) -> io::Result<ExecutorHandle>
where
    E: Evaluator,
    F: FnOnce() -> E + Send + 'static,
{
    let (jobs, inbox) = unbounded::<Job>();
    thread::Builder::new()
        .name("rill-evaluator".to_string())
        .spawn(move || worker_loop(factory(), inbox))?;
    Ok(ExecutorHandle { jobs, interrupt: Arc::new(AtomicBool::new(false)), stale: None })
}

fn worker_loop<E: Evaluator>(mut evaluator: E, inbox: Receiver<Job>) {
    while let Ok(job) = inbox.recv() {
        let reply = match job.request {
            Request::Eval(fragment) => match evaluator.eval(&fragment) {
                Ok(outcome) => Reply::Outcome(outcome),
                // the engine's own wait was broken; report it as a
                // cooperative cancellation
                Err(Interrupted) => Reply::Outcome(EvalOutcome::Cancelled),
            },
            Request::OnEof => Reply::Outcome(evaluator.on_eof()),
            Request::Echo => Reply::Echo(evaluator.echo()),
            Request::Prompt => Reply::Text(evaluator.prompt()),
            Request::ContinuePrompt => Reply::Text(evaluator.continue_prompt()),
            Request::Complete { line, pos } => {
                Reply::Completions(evaluator.complete(&line, pos))
            }
        };
        // a dropped reply receiver means the submitter gave up; keep going
        let _ = job.reply.send(reply);
    }
    debug!("evaluator thread shutting down");
}

impl ExecutorHandle {
    /// An interrupt trigger usable from any thread (for example a signal
    /// handler installed by the embedding host).
    pub fn interrupter(&self) -> Interrupter {
        Interrupter(Arc::clone(&self.interrupt))
    }

    /// A completion source for the line editor, marshalling through the
    /// same worker so completion queries also run on the evaluator
    /// thread.
    pub fn completions(&self) -> CompletionHandle {
        CompletionHandle { jobs: self.jobs.clone() }
    }

    /// Block until the previous interrupted submission's reply arrives,
    /// keeping submissions strictly sequential.
    fn drain_stale(&mut self) {
        if let Some(stale) = self.stale.take() {
            let _ = stale.recv();
        }
    }

    fn submit(&mut self, request: Request) -> Result<Reply, Interrupted> {
        self.drain_stale();
        let (tx, rx) = bounded(1);
        if self.jobs.send(Job { request, reply: tx }).is_err() {
            return Ok(Reply::Outcome(EvalOutcome::HostFailure(Diagnostic::new(
                "evaluator thread terminated",
            ))));
        }
        loop {
            match rx.recv_timeout(INTERRUPT_POLL) {
                Ok(reply) => return Ok(reply),
                Err(RecvTimeoutError::Timeout) => {
                    if self.interrupt.swap(false, Ordering::SeqCst) {
                        self.stale = Some(rx);
                        return Err(Interrupted);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Ok(Reply::Outcome(EvalOutcome::HostFailure(Diagnostic::new(
                        "evaluator thread terminated",
                    ))));
                }
            }
        }
    }

    fn submit_query_text(&mut self, request: Request) -> Result<String, QueryFailure> {
        match self.submit(request) {
            Ok(Reply::Text(result)) => result,
            // submit reports a dead worker as a HostFailure outcome
            Ok(Reply::Outcome(EvalOutcome::HostFailure(d))) => Err(QueryFailure::Failed(d.message)),
            Err(Interrupted) => {
                Err(QueryFailure::Failed("interrupted while reading console settings".to_string()))
            }
            _ => Err(QueryFailure::Failed("unexpected reply from evaluator thread".to_string())),
        }
    }
}

impl Evaluator for ExecutorHandle {
    fn eval(&mut self, fragment: &SourceFragment) -> Result<EvalOutcome, Interrupted> {
        match self.submit(Request::Eval(fragment.clone()))? {
            Reply::Outcome(outcome) => Ok(outcome),
            _ => Ok(EvalOutcome::HostFailure(Diagnostic::new(
                "unexpected reply from evaluator thread",
            ))),
        }
    }

    fn on_eof(&mut self) -> EvalOutcome {
        match self.submit(Request::OnEof) {
            Ok(Reply::Outcome(outcome)) => outcome,
            // an interrupt cannot veto the implicit quit; treat it as a
            // cancellation the driver will resume from
            Err(Interrupted) => EvalOutcome::Cancelled,
            _ => EvalOutcome::HostFailure(Diagnostic::new("unexpected reply from evaluator thread")),
        }
    }

    fn echo(&mut self) -> Result<bool, QueryFailure> {
        match self.submit(Request::Echo) {
            Ok(Reply::Echo(result)) => result,
            Ok(Reply::Outcome(EvalOutcome::HostFailure(d))) => Err(QueryFailure::Failed(d.message)),
            Err(Interrupted) => {
                Err(QueryFailure::Failed("interrupted while reading console settings".to_string()))
            }
            _ => Err(QueryFailure::Failed("unexpected reply from evaluator thread".to_string())),
        }
    }

    fn prompt(&mut self) -> Result<String, QueryFailure> {
        self.submit_query_text(Request::Prompt)
    }

    fn continue_prompt(&mut self) -> Result<String, QueryFailure> {
        self.submit_query_text(Request::ContinuePrompt)
    }

    fn complete(&mut self, line: &str, pos: usize) -> Result<Vec<String>, String> {
        match self.submit(Request::Complete { line: line.to_string(), pos }) {
            Ok(Reply::Completions(result)) => result,
            Err(Interrupted) => Err("interrupted".to_string()),
            _ => Err("unexpected reply from evaluator thread".to_string()),
        }
    }
}

/// Cloneable completion source backed by the evaluator thread.
#[derive(Clone)]
pub struct CompletionHandle {
    jobs: Sender<Job>,
}

impl Completions for CompletionHandle {
    fn complete(&self, line: &str, pos: usize) -> Result<Vec<String>, String> {
        let (tx, rx) = bounded(1);
        self.jobs
            .send(Job { request: Request::Complete { line: line.to_string(), pos }, reply: tx })
            .map_err(|_| "evaluator thread terminated".to_string())?;
        match rx.recv() {
            Ok(Reply::Completions(result)) => result,
            Ok(_) => Err("unexpected reply from evaluator thread".to_string()),
            Err(_) => Err("evaluator thread terminated".to_string()),
        }
    }
}
