//! Diagnostic presentation
//!
//! Formats a [`Diagnostic`] onto the error stream. Failures the engine
//! already reported itself are skipped entirely, and the tail of the
//! stack trace is trimmed twice before printing: first trailing host
//! frames, then trailing frames of the engine's own REPL scaffolding.
//! Both trims walk backward from the end and stop at the first frame
//! that does not match.

use std::io::{self, Write};

use crate::eval::{Diagnostic, FrameOrigin, TraceFrame};

/// Write one diagnostic to `out`.
pub fn present<W: Write>(diagnostic: &Diagnostic, out: &mut W) -> io::Result<()> {
    if diagnostic.already_emitted {
        return Ok(());
    }
    if diagnostic.native_guest_error {
        writeln!(out, "{}", diagnostic.message)?;
    } else {
        writeln!(out, "Error while evaluating: {}", diagnostic.message)?;
    }
    for frame in trimmed(&diagnostic.frames) {
        writeln!(out, "\tat {}", frame.display)?;
    }
    out.flush()
}

fn trimmed(frames: &[TraceFrame]) -> &[TraceFrame] {
    let mut frames = frames;
    while let Some((last, rest)) = frames.split_last() {
        if last.origin == FrameOrigin::Host {
            frames = rest;
        } else {
            break;
        }
    }
    while let Some((last, rest)) = frames.split_last() {
        if last.repl_scaffold {
            frames = rest;
        } else {
            break;
        }
    }
    frames
}
