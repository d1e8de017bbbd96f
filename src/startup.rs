//! Startup policy
//!
//! Turns a strictly parsed [`OptionSet`] into the effective session
//! parameters. Every rule here is a deliberate policy decision carried
//! over from the reference command-line semantics, not incidental
//! glue; see the individual comments.

use std::path::PathBuf;

use thiserror::Error;

use crate::options::{Opt, OptionSet};

/// Contradictory or unusable option combinations. Fatal before the loop
/// ever starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("cannot use -e with -f")]
    FileAndExpression,
    #[error("you must specify '--save', '--no-save' or '--vanilla'")]
    AmbiguousSavePolicy,
    #[error("cannot open file '{path}': No such file or directory")]
    CannotOpenFile { path: String },
    #[error("cannot initialize terminal: {0}")]
    Terminal(String),
}

/// Effective session parameters derived from options plus environment.
#[derive(Debug, Clone)]
pub struct StartupParams {
    pub quiet: bool,
    pub no_init_file: bool,
    pub no_site_file: bool,
    pub no_environ: bool,
    pub restore: bool,
    pub interactive: bool,
    pub ask_for_save: bool,
    pub auto_save: bool,
    pub no_echo: bool,
    pub no_readline: bool,
    pub verbose: bool,
    pub file: Option<PathBuf>,
    pub expressions: Vec<String>,
    pub embedded: bool,
}

impl StartupParams {
    pub fn derive(options: &OptionSet, embedded: bool) -> Result<Self, ConfigurationError> {
        let vanilla = options.flag(Opt::Vanilla);
        let no_echo = options.flag(Opt::NoEcho);

        let expressions: Vec<String> = options.string_list(Opt::Expr).to_vec();
        let mut file = options.string(Opt::File).map(PathBuf::from);
        if file.is_some() && !expressions.is_empty() {
            return Err(ConfigurationError::FileAndExpression);
        }
        // `-f -` means standard input: normalized to "no file" while
        // keeping the non-interactive, no-save semantics a file implies.
        let file_given = file.is_some();
        if file.as_deref() == Some(std::path::Path::new("-")) {
            file = None;
        }

        let batch_input = file_given || !expressions.is_empty();

        // The interactive flag never overrides the presence of -f/-e.
        let interactive = if batch_input {
            false
        } else {
            options.flag(Opt::Interactive)
        };

        // Three-way save decision, skipped entirely on any batch path:
        // slave/no-save/vanilla beat everything, then --save selects
        // auto-save, otherwise the session asks on exit.
        let (ask_for_save, auto_save) = if batch_input {
            (false, false)
        } else if no_echo || options.flag(Opt::NoSave) || vanilla {
            (false, false)
        } else if options.flag(Opt::Save) {
            (false, true)
        } else {
            (true, false)
        };

        Ok(StartupParams {
            quiet: options.flag(Opt::Quiet) || options.flag(Opt::Silent) || no_echo,
            no_init_file: !embedded && options.flag(Opt::NoInitFile) && !vanilla,
            no_site_file: options.flag(Opt::NoSiteFile) || vanilla,
            no_environ: embedded || options.flag(Opt::NoEnviron) || vanilla,
            restore: options.flag(Opt::Restore)
                && !(options.flag(Opt::NoRestore) || options.flag(Opt::NoRestoreData) || vanilla),
            interactive,
            ask_for_save,
            auto_save,
            no_echo,
            no_readline: options.flag(Opt::NoReadline),
            verbose: options.flag(Opt::Verbose),
            file,
            expressions,
            embedded,
        })
    }
}
