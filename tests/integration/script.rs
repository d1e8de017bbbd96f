//! Script-runner pipeline tests
//!
//! The full `rillscript` path: lenient parse, client rewriting of the
//! argument vector, strict re-parse, policy derivation, file-backed
//! console, driver.

use std::io::Write;

use tempfile::NamedTempFile;

use rill::client::{Client, Preprocessed};
use rill::console::{create_console, Console};
use rill::eval::{self, BalanceEvaluator, Evaluator, Origin};
use rill::options::{parse, Opt};
use rill::repl::ReplDriver;
use rill::startup::{ConfigurationError, StartupParams};
use rill::util::config::ReplSettings;

fn script_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn preprocess(args: &[&str]) -> Preprocessed {
    let argv: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let mut set = parse(&argv, false, None).unwrap();
    Client::Script.preprocess(&mut set)
}

#[test]
fn positional_becomes_the_file_option() {
    let Preprocessed::Proceed(adjusted) =
        preprocess(&["rillscript", "--vanilla", "demo.rl", "one", "two"])
    else {
        panic!("expected an adjusted argument vector")
    };
    assert_eq!(
        adjusted,
        vec![
            "rillscript",
            "--no-echo",
            "--no-restore",
            "--vanilla",
            "--file=demo.rl",
            "--args",
            "one",
            "two",
        ]
    );
    // the rewritten vector passes the strict parse unchanged
    let set = parse(&adjusted, true, None).unwrap();
    assert_eq!(set.string(Opt::File), Some("demo.rl"));
    assert!(set.flag(Opt::NoEcho));
}

#[test]
fn expressions_leave_the_positional_slot_alone() {
    let Preprocessed::Proceed(adjusted) = preprocess(&["rillscript", "-e", "1+1"]) else {
        panic!("expected an adjusted argument vector")
    };
    assert_eq!(adjusted, vec!["rillscript", "--no-echo", "--no-restore", "-e", "1+1"]);
}

#[test]
fn no_input_at_all_prints_help() {
    assert_eq!(preprocess(&["rillscript", "--vanilla"]), Preprocessed::PrintHelp);
}

fn script_params(path: &str) -> StartupParams {
    let args = vec!["rillscript".to_string(), path.to_string()];
    let mut lenient = parse(&args, false, None).unwrap();
    let Preprocessed::Proceed(adjusted) = Client::Script.preprocess(&mut lenient) else {
        panic!("expected an adjusted argument vector")
    };
    let strict = parse(&adjusted, true, None).unwrap();
    StartupParams::derive(&strict, false).unwrap()
}

#[test]
fn script_session_runs_to_its_quit_status() {
    let file = script_file("f(x) {\n  x\n}\nquit(6)\n");
    let path = file.path().to_str().unwrap();
    let params = script_params(path);
    assert_eq!(params.file.as_deref(), Some(std::path::Path::new(path)));
    assert!(!params.interactive);

    let console = create_console(&params, &ReplSettings::default(), None).unwrap();
    assert!(matches!(console, Console::Batch(_)));
    let echo = !params.no_echo;
    let evaluator = eval::spawn(move || BalanceEvaluator::with_echo(echo)).unwrap();
    let status = ReplDriver::new(console, evaluator).run().unwrap();
    assert_eq!(status, 6);
}

#[test]
fn script_runner_starts_with_echo_off() {
    let file = script_file("quit\n");
    let params = script_params(file.path().to_str().unwrap());
    assert!(params.no_echo);
    // the evaluator the binary builds from these params must not echo
    let mut evaluator = BalanceEvaluator::with_echo(!params.no_echo);
    assert!(matches!(evaluator.echo(), Ok(false)));
}

#[test]
fn file_console_stamps_the_file_origin() {
    let file = script_file("1 + 1\n");
    let params = StartupParams::derive(
        &parse(
            &[
                "rill".to_string(),
                "-f".to_string(),
                file.path().to_str().unwrap().to_string(),
            ],
            true,
            None,
        )
        .unwrap(),
        false,
    )
    .unwrap();
    let console = create_console(&params, &ReplSettings::default(), None).unwrap();
    match console.origin() {
        Origin::File(path) => assert_eq!(path, file.path()),
        other => panic!("unexpected origin: {other:?}"),
    }
}

#[test]
fn missing_script_file_is_fatal() {
    let params = StartupParams::derive(
        &parse(
            &["rill".to_string(), "-f".to_string(), "/no/such/file.rl".to_string()],
            true,
            None,
        )
        .unwrap(),
        false,
    )
    .unwrap();
    let Err(err) = create_console(&params, &ReplSettings::default(), None) else {
        panic!("a missing script file must be rejected");
    };
    assert!(matches!(err, ConfigurationError::CannotOpenFile { .. }));
}
