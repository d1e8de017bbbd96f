//! Rill interactive console front-end
//!
//! The pieces between a command line and a language engine: option
//! parsing, startup-policy derivation, console selection (terminal,
//! plain stdin, batch, embedded host callbacks) and the read-eval-print
//! loop itself. The engine behind the loop is anything implementing
//! [`eval::Evaluator`]; the bundled [`eval::BalanceEvaluator`] drives
//! the console without a real engine attached.
//!
//! # Example
//!
//! ```no_run
//! use rill::console::{BatchConsole, Console};
//! use rill::eval::BalanceEvaluator;
//! use rill::repl::ReplDriver;
//!
//! let expressions = vec!["1 + 1".to_string(), "quit(0)".to_string()];
//! let console = Console::Batch(BatchConsole::from_expressions(&expressions));
//! let status = ReplDriver::new(console, BalanceEvaluator::new()).run().unwrap();
//! assert_eq!(status, 0);
//! ```

#![doc(html_root_url = "https://docs.rs/rill")]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod console;
pub mod eval;
pub mod options;
pub mod repl;
pub mod startup;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Front-end name
pub const NAME: &str = "Rill";
