//! End-to-end session tests
//!
//! Drive the whole stack (console, executor thread, evaluator, driver)
//! through batch input and check the process-level exit status.

use std::sync::{Arc, Mutex};

use rill::console::{create_embedded_console, BatchConsole, Console, HostCallbacks};
use rill::eval::{self, BalanceEvaluator, Evaluator};
use rill::options::parse;
use rill::repl::ReplDriver;
use rill::startup::StartupParams;
use rill::util::config::ReplSettings;

fn session(lines: &[&str]) -> i32 {
    let expressions: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
    let console = Console::Batch(BatchConsole::from_expressions(&expressions));
    let evaluator = eval::spawn(BalanceEvaluator::new).unwrap();
    ReplDriver::new(console, evaluator).run().unwrap()
}

#[test]
fn empty_session_exits_clean() {
    assert_eq!(session(&[]), 0);
}

#[test]
fn statements_then_eof_exit_zero() {
    assert_eq!(session(&["echo off", "1 + 1", "2 + 2"]), 0);
}

#[test]
fn explicit_quit_status_is_the_exit_status() {
    assert_eq!(session(&["echo off", "quit(7)", "never reached"]), 7);
}

#[test]
fn multi_line_fragment_completes_across_lines() {
    assert_eq!(session(&["echo off", "f(x) {", "  x", "}", "quit(3)"]), 3);
}

#[test]
fn unterminated_fragment_at_eof_still_exits_clean() {
    assert_eq!(session(&["echo off", "f(x) {"]), 0);
}

#[test]
fn failed_last_statement_sets_the_exit_status() {
    assert_eq!(session(&["echo off", "error boom"]), 1);
}

#[test]
fn recovered_failure_does_not_leak_into_the_exit_status() {
    assert_eq!(session(&["echo off", "error boom", "1 + 1"]), 0);
}

#[test]
fn comments_and_blanks_are_no_ops() {
    assert_eq!(session(&["echo off", "# just a comment", "   ", ""]), 0);
}

#[test]
fn interrupter_is_available_from_the_executor() {
    // not exercised against a blocked evaluation here (covered in the
    // executor's own tests); the handle must simply be obtainable and
    // cloneable before the driver takes ownership
    let evaluator = eval::spawn(BalanceEvaluator::new).unwrap();
    let interrupter = evaluator.interrupter();
    let _clone = interrupter.clone();
    let console = Console::Batch(BatchConsole::from_expressions(&["quit(0)".to_string()]));
    assert_eq!(ReplDriver::new(console, evaluator).run().unwrap(), 0);
}

#[test]
fn direct_evaluator_and_executor_agree() {
    let expressions = vec!["echo off".to_string(), "quit(9)".to_string()];
    let direct = ReplDriver::new(
        Console::Batch(BatchConsole::from_expressions(&expressions)),
        BalanceEvaluator::new(),
    )
    .run()
    .unwrap();
    let marshalled = ReplDriver::new(
        Console::Batch(BatchConsole::from_expressions(&expressions)),
        eval::spawn(BalanceEvaluator::new).unwrap(),
    )
    .run()
    .unwrap();
    assert_eq!(direct, marshalled);
    assert_eq!(direct, 9);
}

#[test]
fn completion_queries_reach_the_worker_evaluator() {
    let evaluator = eval::spawn(BalanceEvaluator::new).unwrap();
    let completions = evaluator.completions();
    let candidates = rill::eval::Completions::complete(&completions, "qu", 2).unwrap();
    assert_eq!(candidates, vec!["quit".to_string()]);
    drop(evaluator);
}

#[test]
fn expression_unescaping_applies_to_batch_lines() {
    // `~+~` stands for a space in -e expressions
    let console = BatchConsole::from_expressions(&["echo~+~off".to_string()]);
    let mut console = Console::Batch(console);
    assert_eq!(console.read_line().unwrap(), Some("echo off".to_string()));
}

#[test]
fn embedded_callbacks_carry_a_whole_session() {
    // host supplies the input lines and captures stderr; the built-in
    // console delegate is never touched
    let mut lines = vec!["error boom".to_string()];
    lines.reverse();
    let stderr = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stderr);
    let callbacks = HostCallbacks {
        read_line: Some(Box::new(move |_prompt| lines.pop())),
        write_stderr: Some(Box::new(move |bytes| {
            sink.lock().unwrap().extend_from_slice(bytes);
        })),
        ..HostCallbacks::default()
    };

    let argv: Vec<String> = ["rill", "--no-save"].iter().map(|s| s.to_string()).collect();
    let params = StartupParams::derive(&parse(&argv, true, None).unwrap(), true).unwrap();
    let console =
        create_embedded_console(&params, &ReplSettings::default(), callbacks).unwrap();

    let status = ReplDriver::new(console, BalanceEvaluator::with_echo(false))
        .run()
        .unwrap();
    // the failed statement sets the status the EOF quit then reports
    assert_eq!(status, 1);
    let written = String::from_utf8(stderr.lock().unwrap().clone()).unwrap();
    assert_eq!(written, "boom\n");
}

#[test]
fn evaluator_initial_prompts() {
    let mut evaluator = BalanceEvaluator::new();
    assert_eq!(evaluator.prompt().unwrap(), "> ");
    assert_eq!(evaluator.continue_prompt().unwrap(), "+ ");
    assert_eq!(evaluator.echo().unwrap(), true);
}
