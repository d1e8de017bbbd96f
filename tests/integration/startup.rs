//! Startup policy integration tests

use rill::options::parse;
use rill::startup::{ConfigurationError, StartupParams};

fn derive(args: &[&str]) -> Result<StartupParams, ConfigurationError> {
    let argv: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    StartupParams::derive(&parse(&argv, true, None).unwrap(), false)
}

#[test]
fn vanilla_folds_into_its_components() {
    let p = derive(&["rill", "--vanilla"]).unwrap();
    assert!(p.no_site_file);
    assert!(p.no_environ);
    assert!(!p.restore);
    assert!(!p.ask_for_save);
    assert!(!p.auto_save);
    // the user profile fold is deliberately not part of --vanilla
    assert!(!p.no_init_file);
}

#[test]
fn file_and_expression_together_are_rejected() {
    let err = derive(&["rill", "-f", "a.rl", "-e", "1"]).unwrap_err();
    assert_eq!(err, ConfigurationError::FileAndExpression);
}

#[test]
fn save_policy_resolution() {
    // default: ask at the end of an interactive session
    let p = derive(&["rill", "--interactive"]).unwrap();
    assert!(p.ask_for_save);
    assert!(!p.auto_save);

    let p = derive(&["rill", "--save"]).unwrap();
    assert!(!p.ask_for_save);
    assert!(p.auto_save);

    let p = derive(&["rill", "--no-save"]).unwrap();
    assert!(!p.ask_for_save);
    assert!(!p.auto_save);
}

#[test]
fn no_echo_implies_quiet() {
    let p = derive(&["rill", "--no-echo"]).unwrap();
    assert!(p.no_echo);
    assert!(p.quiet);
}

#[test]
fn batch_input_wins_over_the_interactive_flag() {
    let p = derive(&["rill", "--interactive", "-e", "1"]).unwrap();
    assert!(!p.interactive);
    assert_eq!(p.expressions, vec!["1".to_string()]);
}

#[test]
fn dash_file_means_stdin() {
    let p = derive(&["rill", "-f", "-"]).unwrap();
    assert!(p.file.is_none());
    assert!(!p.interactive);
}
