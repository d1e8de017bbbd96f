//! Client modes
//!
//! The front-end serves two client identities: the interactive console
//! (`rill`) and the script runner (`rillscript`). They share the option
//! table but apply different post-processing to the argument vector
//! before the strict re-parse: the script runner always forces non-echo
//! and non-restore and maps a single positional argument onto the file
//! option when no expressions were given.

use once_cell::sync::Lazy;

use crate::options::{self, Opt, OptionSet};
use crate::VERSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Client {
    /// The interactive console (`rill`).
    Console,
    /// The script runner (`rillscript`).
    Script,
}

/// What the binary should do after client preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preprocessed {
    /// Continue with the adjusted argument vector.
    Proceed(Vec<String>),
    PrintVersion,
    PrintHelp,
}

static OPTION_HELP: Lazy<String> = Lazy::new(options::render_option_help);

impl Client {
    pub fn from_argument_name(name: &str) -> Option<Client> {
        match name {
            "rill" => Some(Client::Console),
            "rillscript" => Some(Client::Script),
            _ => None,
        }
    }

    pub fn argument_name(self) -> &'static str {
        match self {
            Client::Console => "rill",
            Client::Script => "rillscript",
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            Client::Console => {
                "\nUsage: rill [options] [< infile] [> outfile]\n\n\
                 Start the Rill console with the specified options.\n"
            }
            Client::Script => "\nUsage: rillscript [--options] [-e expr [-e expr2 ...] | file] [args]\n",
        }
    }

    /// The startup banner printed for interactive sessions (and by
    /// `--version`).
    pub fn help_message(self) -> String {
        match self {
            Client::Console => format!(
                "Rill version {VERSION}\n\
                 Rill is free software and comes with ABSOLUTELY NO WARRANTY.\n\
                 You are welcome to redistribute it under certain conditions.\n"
            ),
            Client::Script => format!("Rill scripting front-end version {VERSION}\n"),
        }
    }

    /// Usage banner plus the generated option table.
    pub fn help(self) -> String {
        format!("{}\n{}", self.usage(), *OPTION_HELP)
    }

    /// Apply client-specific post-processing to a leniently parsed
    /// option set, producing the argument vector for the strict re-parse.
    pub fn preprocess(self, options: &mut OptionSet) -> Preprocessed {
        if options.flag(Opt::Help) {
            return Preprocessed::PrintHelp;
        }
        if options.flag(Opt::Version) {
            return Preprocessed::PrintVersion;
        }
        match self {
            Client::Console => Preprocessed::Proceed(options.arguments().to_vec()),
            Client::Script => preprocess_script(options),
        }
    }
}

/// Reformat the script runner's arguments: inject `--no-echo` and
/// `--no-restore`, turn the first positional into `--file=...` when no
/// `-e` expressions were given, and push residual positionals behind an
/// `--args` sentinel.
fn preprocess_script(options: &mut OptionSet) -> Preprocessed {
    let arguments = options.arguments().to_vec();
    let mut first_non_option = options.first_non_option();

    let mut adjusted = Vec::with_capacity(arguments.len() + 4);
    adjusted.push(arguments[0].clone());
    adjusted.push("--no-echo".to_string());
    options.set_flag(Opt::NoEcho, true);
    adjusted.push("--no-restore".to_string());
    options.set_flag(Opt::NoRestore, true);

    // Either -e expressions are given or the first positional is a file.
    if options.string_list(Opt::Expr).is_empty() {
        if first_non_option == arguments.len() {
            return Preprocessed::PrintHelp;
        }
        let file = arguments[first_non_option].clone();
        options.set_string(Opt::File, file);
    }

    let mut rx = 1;
    while rx < first_non_option {
        adjusted.push(arguments[rx].clone());
        rx += 1;
    }
    if let Some(file) = options.string(Opt::File) {
        adjusted.push(format!("--file={file}"));
        rx += 1; // skip over the file positional
        first_non_option += 1;
    }
    if first_non_option < arguments.len() {
        adjusted.push("--args".to_string());
        while rx < arguments.len() {
            adjusted.push(arguments[rx].clone());
            rx += 1;
        }
    }
    Preprocessed::Proceed(adjusted)
}
