//! Option parsing integration tests
//!
//! The two-pass contract: the lenient pass and the strict pass must
//! agree on exactly which token indices they consumed, whatever the
//! argument vector looks like.

use proptest::prelude::*;

use rill::client::{Client, Preprocessed};
use rill::options::{parse, Opt, UsageError};

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[test]
fn lenient_then_strict_reparse_is_routine() {
    let args = argv(&["rill", "--vanilla", "-q", "-e", "1 + 1"]);
    let mut lenient_set = parse(&args, false, None).unwrap();
    let adjusted = match Client::Console.preprocess(&mut lenient_set) {
        Preprocessed::Proceed(adjusted) => adjusted,
        other => panic!("unexpected preprocessing result: {other:?}"),
    };
    let strict_set = parse(&adjusted, true, None).unwrap();
    assert!(strict_set.flag(Opt::Vanilla));
    assert!(strict_set.flag(Opt::Quiet));
    assert_eq!(strict_set.string_list(Opt::Expr), ["1 + 1"]);
}

#[test]
fn version_short_circuits_preprocessing() {
    let args = argv(&["rill", "--version", "-e", "1"]);
    let mut set = parse(&args, false, None).unwrap();
    assert_eq!(Client::Console.preprocess(&mut set), Preprocessed::PrintVersion);
}

#[test]
fn help_short_circuits_preprocessing() {
    let args = argv(&["rill", "-h"]);
    let mut set = parse(&args, false, None).unwrap();
    assert_eq!(Client::Console.preprocess(&mut set), Preprocessed::PrintHelp);
}

#[test]
fn unknown_option_survives_lenient_but_fails_strict() {
    let args = argv(&["rill", "--frobnicate", "--quiet"]);
    let mut rec = vec![false; args.len()];
    let set = parse(&args, false, Some(&mut rec)).unwrap();
    assert!(set.flag(Opt::Quiet));
    assert!(rec.iter().all(|r| *r));

    let err = parse(&args, true, None).unwrap_err();
    assert_eq!(err, UsageError::UnknownOption("--frobnicate".to_string()));
}

#[test]
fn everything_after_args_is_left_alone() {
    let args = argv(&["rill", "--no-save", "--args", "--vanilla", "whatever"]);
    let set = parse(&args, true, None).unwrap();
    assert!(set.flag(Opt::NoSave));
    // --vanilla after the sentinel is payload, not an option
    assert!(!set.flag(Opt::Vanilla));
    assert_eq!(set.first_non_option(), 3);
    assert_eq!(&set.arguments()[set.first_non_option()..], &args[3..]);
}

/// Tokens that are valid under both passes.
fn known_token() -> impl Strategy<Value = Vec<String>> {
    prop_oneof![
        Just(vec!["--vanilla".to_string()]),
        Just(vec!["--quiet".to_string()]),
        Just(vec!["--no-save".to_string()]),
        Just(vec!["--save".to_string()]),
        Just(vec!["--no-restore".to_string()]),
        Just(vec!["--no-echo".to_string()]),
        Just(vec!["--slave".to_string()]),
        Just(vec!["--interactive".to_string()]),
        "[a-z]{1,8}".prop_map(|e| vec!["-e".to_string(), e]),
        "[a-z]{1,8}".prop_map(|f| vec![format!("--file={f}")]),
    ]
}

fn args_tail() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z-]{0,6}", 0..4).prop_map(|tail| {
        if tail.is_empty() {
            Vec::new()
        } else {
            let mut v = vec!["--args".to_string()];
            v.extend(tail);
            v
        }
    })
}

proptest! {
    #[test]
    fn both_passes_recognize_the_same_indices(
        tokens in proptest::collection::vec(known_token(), 0..6),
        tail in args_tail(),
    ) {
        let mut args = vec!["rill".to_string()];
        for token in tokens {
            args.extend(token);
        }
        args.extend(tail);

        let mut lenient = vec![false; args.len()];
        let mut strict = vec![false; args.len()];
        parse(&args, false, Some(&mut lenient)).unwrap();
        parse(&args, true, Some(&mut strict)).unwrap();
        prop_assert_eq!(lenient, strict);
    }

    #[test]
    fn lenient_marks_unknown_long_options_consumed(suffix in "[a-z]{3,10}") {
        let args = vec!["rill".to_string(), format!("--zz-{suffix}")];
        let mut rec = vec![false; args.len()];
        parse(&args, false, Some(&mut rec)).unwrap();
        prop_assert!(rec[1]);
        prop_assert!(parse(&args, true, None).is_err());
    }
}
