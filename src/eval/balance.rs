//! Built-in evaluator
//!
//! A self-contained [`Evaluator`] that gives the console something real
//! to drive without an attached language engine. Incompleteness is
//! judged by delimiter balance, so multi-line input behaves the way it
//! does against a full parser: an unterminated block keeps asking for
//! more lines and only the closing delimiter submits the fragment.

use tracing::debug;

use super::{
    Diagnostic, EvalOutcome, Evaluator, Interrupted, QueryFailure, SourceFragment, TraceFrame,
};

const KEYWORDS: &[&str] = &["echo", "error", "help", "off", "on", "quit", "trace"];

/// Evaluator backed by nothing but a delimiter scanner and a handful of
/// console commands.
pub struct BalanceEvaluator {
    echo: bool,
    prompt: String,
    continue_prompt: String,
}

impl Default for BalanceEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceEvaluator {
    pub fn new() -> Self {
        Self::with_echo(true)
    }

    /// `echo` is the initial echo state; the script runner starts its
    /// sessions with echo off.
    pub fn with_echo(echo: bool) -> Self {
        Self {
            echo,
            prompt: "> ".to_string(),
            continue_prompt: "+ ".to_string(),
        }
    }

    /// A fragment is complete when every opened delimiter is closed and
    /// no string literal is left open. An excess closer is treated as
    /// complete so the parser, not the accumulator, reports it.
    fn is_complete(text: &str) -> bool {
        let mut braces = 0usize;
        let mut brackets = 0usize;
        let mut parens = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for c in text.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if in_string => escaped = true,
                '"' => in_string = !in_string,
                _ if in_string => {}
                '{' => braces += 1,
                '}' => match braces.checked_sub(1) {
                    Some(n) => braces = n,
                    None => return true,
                },
                '[' => brackets += 1,
                ']' => match brackets.checked_sub(1) {
                    Some(n) => brackets = n,
                    None => return true,
                },
                '(' => parens += 1,
                ')' => match parens.checked_sub(1) {
                    Some(n) => parens = n,
                    None => return true,
                },
                _ => {}
            }
        }

        braces == 0 && brackets == 0 && parens == 0 && !in_string && !escaped
    }

    fn run_command(&mut self, text: &str) -> EvalOutcome {
        match text {
            "quit" => return EvalOutcome::ExitRequested { status: 0 },
            "echo on" => {
                self.echo = true;
                return EvalOutcome::Completed;
            }
            "echo off" => {
                self.echo = false;
                return EvalOutcome::Completed;
            }
            "help" => {
                println!("commands: quit, quit(STATUS), echo on, echo off, error MSG, trace MSG");
                return EvalOutcome::Completed;
            }
            _ => {}
        }
        if let Some(status) = text.strip_prefix("quit(").and_then(|rest| {
            rest.strip_suffix(')').and_then(|n| n.trim().parse::<i32>().ok())
        }) {
            return EvalOutcome::ExitRequested { status };
        }
        if let Some(message) = text.strip_prefix("error ") {
            return EvalOutcome::GuestFailure(Diagnostic::new(message.trim()).native());
        }
        if let Some(message) = text.strip_prefix("trace ") {
            let diagnostic = Diagnostic::new(message.trim()).with_frames(vec![
                TraceFrame::guest(format!("{message} at <repl>")),
                TraceFrame::scaffold("repl wrapper"),
                TraceFrame::host("engine internal"),
            ]);
            return EvalOutcome::GuestFailure(diagnostic);
        }
        EvalOutcome::Completed
    }
}

impl Evaluator for BalanceEvaluator {
    fn eval(&mut self, fragment: &SourceFragment) -> Result<EvalOutcome, Interrupted> {
        let text = fragment.text().trim();
        if !Self::is_complete(text) {
            return Ok(EvalOutcome::IncompleteSource);
        }
        debug!(fragment = %fragment.name(), "evaluating");
        let outcome = self.run_command(text);
        if self.echo && matches!(outcome, EvalOutcome::Completed) {
            println!("{text}");
        }
        Ok(outcome)
    }

    fn on_eof(&mut self) -> EvalOutcome {
        EvalOutcome::ExitRequested { status: 0 }
    }

    fn echo(&mut self) -> Result<bool, QueryFailure> {
        Ok(self.echo)
    }

    fn prompt(&mut self) -> Result<String, QueryFailure> {
        Ok(self.prompt.clone())
    }

    fn continue_prompt(&mut self) -> Result<String, QueryFailure> {
        Ok(self.continue_prompt.clone())
    }

    fn complete(&mut self, line: &str, pos: usize) -> Result<Vec<String>, String> {
        let prefix = &line[..pos.min(line.len())];
        let word = prefix
            .rfind(|c: char| !c.is_alphanumeric())
            .map_or(prefix, |i| &prefix[i + 1..]);
        Ok(KEYWORDS
            .iter()
            .filter(|k| k.starts_with(word))
            .map(|k| k.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Origin;

    fn eval(evaluator: &mut BalanceEvaluator, text: &str) -> EvalOutcome {
        let fragment = SourceFragment::new(text, 1, Origin::Interactive);
        evaluator.eval(&fragment).unwrap()
    }

    #[test]
    fn balanced_input_is_complete() {
        assert!(BalanceEvaluator::is_complete("1 + 2"));
        assert!(BalanceEvaluator::is_complete("f(x) { g[1] }"));
        assert!(BalanceEvaluator::is_complete("\"a { b\""));
    }

    #[test]
    fn unbalanced_input_is_incomplete() {
        assert!(!BalanceEvaluator::is_complete("f(x) {"));
        assert!(!BalanceEvaluator::is_complete("("));
        assert!(!BalanceEvaluator::is_complete("\"open string"));
    }

    #[test]
    fn excess_closer_is_reported_as_complete() {
        assert!(BalanceEvaluator::is_complete("}"));
        assert!(BalanceEvaluator::is_complete("x)"));
    }

    #[test]
    fn open_block_asks_for_more_input() {
        let mut e = BalanceEvaluator::new();
        assert!(matches!(eval(&mut e, "if (x) {"), EvalOutcome::IncompleteSource));
        assert!(matches!(eval(&mut e, "if (x) {\n}"), EvalOutcome::Completed));
    }

    #[test]
    fn quit_carries_the_requested_status() {
        let mut e = BalanceEvaluator::new();
        assert!(matches!(eval(&mut e, "quit"), EvalOutcome::ExitRequested { status: 0 }));
        assert!(matches!(eval(&mut e, "quit(7)"), EvalOutcome::ExitRequested { status: 7 }));
    }

    #[test]
    fn initial_echo_state_is_configurable() {
        assert!(BalanceEvaluator::new().echo);
        assert!(!BalanceEvaluator::with_echo(false).echo);
    }

    #[test]
    fn echo_commands_flip_the_setting() {
        let mut e = BalanceEvaluator::new();
        assert_eq!(e.echo, true);
        eval(&mut e, "echo off");
        assert_eq!(e.echo, false);
        eval(&mut e, "echo on");
        assert_eq!(e.echo, true);
    }

    #[test]
    fn error_command_is_a_native_guest_failure() {
        let mut e = BalanceEvaluator::new();
        match eval(&mut e, "error something broke") {
            EvalOutcome::GuestFailure(d) => {
                assert_eq!(d.message, "something broke");
                assert!(d.native_guest_error);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn trace_command_carries_frames() {
        let mut e = BalanceEvaluator::new();
        match eval(&mut e, "trace boom") {
            EvalOutcome::GuestFailure(d) => {
                assert_eq!(d.frames.len(), 3);
                assert!(d.frames[1].repl_scaffold);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn completion_matches_the_word_under_the_cursor() {
        let mut e = BalanceEvaluator::new();
        assert_eq!(e.complete("qu", 2).unwrap(), vec!["quit".to_string()]);
        assert_eq!(e.complete("echo o", 6).unwrap(), vec!["off".to_string(), "on".to_string()]);
    }

    #[test]
    fn eof_requests_a_clean_exit() {
        let mut e = BalanceEvaluator::new();
        assert!(matches!(e.on_eof(), EvalOutcome::ExitRequested { status: 0 }));
    }
}
