//! Rill console front-end - CLI

use std::io::IsTerminal;
use std::process::exit;
use std::sync::Arc;

use tracing::warn;

use rill::client::{Client, Preprocessed};
use rill::console::create_console;
use rill::eval::{self, BalanceEvaluator, Completions, Evaluator};
use rill::repl::{report_unexpected, ReplDriver};
use rill::startup::StartupParams;
use rill::util::config::{load_user_config, UserConfig};
use rill::util::logger::{self, LogLevel};
use rill::{options, NAME, VERSION};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    exit(run(args));
}

fn run(mut args: Vec<String>) -> i32 {
    // The client identity comes from the executable name; the argument
    // vector then carries the canonical client name in slot zero.
    let client = args
        .first()
        .map(|argv0| {
            if argv0.ends_with("rillscript") {
                Client::Script
            } else {
                Client::Console
            }
        })
        .unwrap_or(Client::Console);
    if args.is_empty() {
        args.push(client.argument_name().to_string());
    } else {
        args[0] = client.argument_name().to_string();
    }

    // a terminal session is interactive unless told otherwise
    if client == Client::Console
        && std::io::stdin().is_terminal()
        && !args.iter().any(|a| a == "--interactive")
    {
        args.insert(1, "--interactive".to_string());
    }

    // Lenient pass: warn about unknown tokens, let the client rewrite
    // the vector, then re-parse strictly.
    let mut lenient = match options::parse(&args, false, None) {
        Ok(set) => set,
        Err(e) => return usage_failure(client, &e.to_string()),
    };
    let adjusted = match client.preprocess(&mut lenient) {
        Preprocessed::PrintVersion => {
            print!("{}", client.help_message());
            return 0;
        }
        Preprocessed::PrintHelp => {
            print!("{}", client.help());
            return 0;
        }
        Preprocessed::Proceed(adjusted) => adjusted,
    };
    let strict = match options::parse(&adjusted, true, None) {
        Ok(set) => set,
        Err(e) => return usage_failure(client, &e.to_string()),
    };

    let params = match StartupParams::derive(&strict, false) {
        Ok(params) => params,
        Err(e) => return usage_failure(client, &e.to_string()),
    };

    logger::init_with_level(if params.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    let config = match load_user_config() {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring user config: {e}");
            UserConfig::default()
        }
    };

    // The evaluator lives on its own thread; every interaction with it,
    // completion queries included, is marshalled there. --no-echo (which
    // the script runner always injects) sets the initial echo state.
    let echo = !params.no_echo;
    let evaluator = match eval::spawn(move || BalanceEvaluator::with_echo(echo)) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("cannot start evaluator thread: {e}");
            return 1;
        }
    };
    let completions: Arc<dyn Completions> = Arc::new(evaluator.completions());

    let console = match create_console(&params, &config.repl, Some(completions)) {
        Ok(console) => console,
        Err(e) => return usage_failure(client, &e.to_string()),
    };

    if console.is_interactive() && !params.quiet && !params.no_echo {
        print!("{}", client.help_message());
    }

    session_loop(console, evaluator)
}

fn session_loop<E: Evaluator>(console: rill::console::Console, evaluator: E) -> i32 {
    tracing::debug!("{} {} session starting", NAME, VERSION);
    let started = std::time::Instant::now();
    let status = match ReplDriver::new(console, evaluator).run() {
        Ok(status) => status,
        Err(e) => {
            report_unexpected(&e);
            1
        }
    };
    tracing::debug!(elapsed = ?started.elapsed(), status, "session finished");
    status
}

fn usage_failure(client: Client, message: &str) -> i32 {
    eprintln!("{message}");
    eprintln!("{}", client.usage());
    2
}
