//! Command-line option model
//!
//! A declarative table of the recognized options plus a two-pass parser:
//! a lenient first pass that warns about unknown tokens but still marks
//! them consumed (so a later, more specific stage can pick them up), and
//! a strict re-parse that rejects anything unrecognized. Both passes
//! agree on which token indices they consumed.
//!
//! Matching follows the classic R-style grammar: boolean forms match a
//! token exactly, string-valued short forms (`-f FILE`) consume the next
//! token, string-valued long forms require an embedded `=`
//! (`--file=FILE`). First declaration wins ties.

use thiserror::Error;

use crate::client::Client;

/// Value shape of an option, fixed at declaration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKind {
    Boolean,
    Str,
    RepeatedStr,
}

/// The recognized command-line options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opt {
    Help,
    Version,
    Encoding,
    Save,
    NoSave,
    NoEnviron,
    NoSiteFile,
    NoInitFile,
    Restore,
    NoRestoreData,
    NoRestoreHistory,
    NoRestore,
    Vanilla,
    NoReadline,
    Quiet,
    Silent,
    NoEcho,
    Interactive,
    Verbose,
    Args,
    File,
    Expr,
}

pub(crate) struct Decl {
    pub opt: Opt,
    pub kind: OptKind,
    /// Accepted syntactically but only warned about, never acted on.
    pub implemented: bool,
    /// Short form including the leading `-`.
    pub short: Option<&'static str>,
    /// Space-separated value name for help output, e.g. ` FILE`.
    pub short_suffix: Option<&'static str>,
    /// Long form including the leading `--`.
    pub long: Option<&'static str>,
    /// `=`-separated value name for help output, e.g. `=FILE`.
    pub long_suffix: Option<&'static str>,
    pub default_flag: bool,
    pub help: &'static str,
}

const fn flag(opt: Opt, long: &'static str, help: &'static str) -> Decl {
    Decl {
        opt,
        kind: OptKind::Boolean,
        implemented: true,
        short: None,
        short_suffix: None,
        long: Some(long),
        long_suffix: None,
        default_flag: false,
        help,
    }
}

/// Declaration order is the matching tie-break.
pub(crate) const DECLS: &[Decl] = &[
    Decl {
        short: Some("-h"),
        ..flag(Opt::Help, "--help", "Print short help message and exit")
    },
    flag(Opt::Version, "--version", "Print version info and exit"),
    Decl {
        opt: Opt::Encoding,
        kind: OptKind::Str,
        implemented: false,
        short: None,
        short_suffix: None,
        long: Some("--encoding"),
        long_suffix: Some("=ENC"),
        default_flag: false,
        help: "Specify encoding to be used for stdin",
    },
    flag(Opt::Save, "--save", "Do save workspace at the end of the session"),
    flag(Opt::NoSave, "--no-save", "Don't save it"),
    flag(Opt::NoEnviron, "--no-environ", "Don't read the site and user environment files"),
    flag(Opt::NoSiteFile, "--no-site-file", "Don't read the site-wide profile"),
    flag(Opt::NoInitFile, "--no-init-file", "Don't read the user profile"),
    Decl {
        default_flag: true,
        ..flag(Opt::Restore, "--restore", "Do restore previously saved objects at startup")
    },
    flag(Opt::NoRestoreData, "--no-restore-data", "Don't restore previously saved objects"),
    Decl {
        implemented: false,
        ..flag(Opt::NoRestoreHistory, "--no-restore-history", "Don't restore the history file")
    },
    flag(Opt::NoRestore, "--no-restore", "Don't restore anything"),
    flag(
        Opt::Vanilla,
        "--vanilla",
        "Combine --no-save, --no-restore, --no-site-file,\n--no-init-file and --no-environ",
    ),
    flag(Opt::NoReadline, "--no-readline", "Don't use readline for command-line editing"),
    Decl {
        short: Some("-q"),
        ..flag(Opt::Quiet, "--quiet", "Don't print startup message")
    },
    flag(Opt::Silent, "--silent", "Same as --quiet"),
    Decl {
        short: Some("-s"),
        ..flag(Opt::NoEcho, "--no-echo", "Make the session run as quietly as possible")
    },
    flag(Opt::Interactive, "--interactive", "Force an interactive session"),
    flag(Opt::Verbose, "--verbose", "Print more information about progress"),
    flag(Opt::Args, "--args", "Skip the rest of the command line"),
    Decl {
        opt: Opt::File,
        kind: OptKind::Str,
        implemented: true,
        short: Some("-f"),
        short_suffix: Some(" FILE"),
        long: Some("--file"),
        long_suffix: Some("=FILE"),
        default_flag: false,
        help: "Take input from 'FILE'",
    },
    Decl {
        opt: Opt::Expr,
        kind: OptKind::RepeatedStr,
        implemented: true,
        short: Some("-e"),
        short_suffix: Some(" EXPR"),
        long: None,
        long_suffix: None,
        default_flag: false,
        help: "Execute 'EXPR' and exit",
    },
];

impl Opt {
    pub(crate) fn decl(self) -> &'static Decl {
        // DECLS holds exactly one entry per variant.
        DECLS
            .iter()
            .find(|d| d.opt == self)
            .unwrap_or_else(|| unreachable!("option without declaration"))
    }

    fn kind(self) -> OptKind {
        self.decl().kind
    }
}

#[derive(Debug, Clone, Default)]
enum OptValue {
    #[default]
    Unset,
    Flag(bool),
    Str(String),
    List(Vec<String>),
}

/// Hard failures of the strict parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("option '{0}' requires a value")]
    MissingValue(&'static str),
}

/// Immutable-once-parsed option values plus the raw argument vector and
/// the index of the first non-option argument.
#[derive(Debug, Clone)]
pub struct OptionSet {
    client: Option<Client>,
    values: Vec<OptValue>,
    arguments: Vec<String>,
    first_non_option: usize,
}

impl OptionSet {
    pub fn client(&self) -> Option<Client> {
        self.client
    }

    fn slot(&self, opt: Opt) -> &OptValue {
        &self.values[DECLS.iter().position(|d| d.opt == opt).unwrap_or(0)]
    }

    fn slot_mut(&mut self, opt: Opt) -> &mut OptValue {
        &mut self.values[DECLS.iter().position(|d| d.opt == opt).unwrap_or(0)]
    }

    pub fn flag(&self, opt: Opt) -> bool {
        debug_assert_eq!(opt.kind(), OptKind::Boolean);
        match self.slot(opt) {
            OptValue::Flag(v) => *v,
            _ => opt.decl().default_flag,
        }
    }

    pub fn string(&self, opt: Opt) -> Option<&str> {
        debug_assert_eq!(opt.kind(), OptKind::Str);
        match self.slot(opt) {
            OptValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn string_list(&self, opt: Opt) -> &[String] {
        debug_assert_eq!(opt.kind(), OptKind::RepeatedStr);
        match self.slot(opt) {
            OptValue::List(v) => v,
            _ => &[],
        }
    }

    pub fn set_flag(&mut self, opt: Opt, value: bool) {
        debug_assert_eq!(opt.kind(), OptKind::Boolean);
        *self.slot_mut(opt) = OptValue::Flag(value);
    }

    pub fn set_string(&mut self, opt: Opt, value: impl Into<String>) {
        match opt.kind() {
            OptKind::RepeatedStr => match self.slot_mut(opt) {
                OptValue::List(list) => list.push(value.into()),
                slot => *slot = OptValue::List(vec![value.into()]),
            },
            _ => *self.slot_mut(opt) = OptValue::Str(value.into()),
        }
    }

    /// The argument vector this set was parsed from (element zero is the
    /// client name).
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn set_arguments(&mut self, arguments: Vec<String>) {
        self.arguments = arguments;
    }

    /// Index of the first non-option argument, or `arguments().len()` if
    /// there is none.
    pub fn first_non_option(&self) -> usize {
        self.first_non_option
    }
}

struct Match {
    opt: Opt,
    /// Short string form matched; the value is the next token.
    takes_next: bool,
}

fn match_option(arg: &str) -> Option<Match> {
    // --slave is a silently accepted alias for --no-echo, with no help
    // entry, the way GNU-R treats it.
    if arg == "--slave" {
        return Some(Match { opt: Opt::NoEcho, takes_next: false });
    }

    for decl in DECLS {
        match decl.opt.kind() {
            OptKind::Boolean => {
                if decl.short == Some(arg) || decl.long == Some(arg) {
                    return Some(Match { opt: decl.opt, takes_next: false });
                }
            }
            OptKind::Str | OptKind::RepeatedStr => {
                if decl.short == Some(arg) {
                    return Some(Match { opt: decl.opt, takes_next: true });
                }
                if let Some(long) = decl.long {
                    if arg.contains('=') && arg.starts_with(long) &&
                        arg.as_bytes().get(long.len()) == Some(&b'=')
                    {
                        return Some(Match { opt: decl.opt, takes_next: false });
                    }
                }
            }
        }
    }
    None
}

/// Parse an argument vector.
///
/// Element zero is conventionally the client name (`rill`/`rillscript`);
/// the first token not starting with `-` is consumed as the client slot
/// whatever its spelling. With `strict == false` unknown tokens warn and
/// are marked consumed; with `strict == true` they are a hard failure.
/// `recognized`, when supplied, must be the same length as `args` and is
/// filled with the set of consumed token indices.
pub fn parse(
    args: &[String],
    strict: bool,
    mut recognized: Option<&mut Vec<bool>>,
) -> Result<OptionSet, UsageError> {
    if let Some(rec) = recognized.as_deref_mut() {
        debug_assert_eq!(rec.len(), args.len());
    }
    let mut mark = |rec: &mut Option<&mut Vec<bool>>, i: usize| {
        if let Some(rec) = rec.as_deref_mut() {
            rec[i] = true;
        }
    };

    let mut values: Vec<OptValue> = (0..DECLS.len()).map(|_| OptValue::Unset).collect();
    let mut set_string = |values: &mut Vec<OptValue>, opt: Opt, value: String| {
        let idx = DECLS.iter().position(|d| d.opt == opt).unwrap_or(0);
        if opt.kind() == OptKind::RepeatedStr {
            match &mut values[idx] {
                OptValue::List(list) => list.push(value),
                slot => *slot = OptValue::List(vec![value]),
            }
        } else {
            values[idx] = OptValue::Str(value);
        }
    };

    // The client slot: the first token that does not look like an option.
    let mut client = None;
    let mut client_idx = None;
    for (i, arg) in args.iter().enumerate() {
        if !arg.starts_with('-') {
            client = Client::from_argument_name(arg);
            client_idx = Some(i);
            mark(&mut recognized, i);
            break;
        }
    }

    let mut first_non_option = args.len();
    let mut i = 0;
    while i < args.len() {
        if Some(i) == client_idx {
            i += 1;
            continue;
        }
        let arg = &args[i];
        let Some(m) = match_option(arg) else {
            let is_option = arg.starts_with('-');
            if !is_option && client == Some(Client::Script) {
                // for the script runner a positional ends option scanning
                mark(&mut recognized, i);
                first_non_option = i;
                break;
            }
            if strict {
                return Err(UsageError::UnknownOption(arg.clone()));
            }
            // GNU-R does not abort here, it simply issues a warning
            println!("WARNING: unknown option '{arg}'");
            mark(&mut recognized, i);
            i += 1;
            continue;
        };
        mark(&mut recognized, i);
        let decl = m.opt.decl();
        if m.takes_next && i == args.len() - 1 {
            return Err(UsageError::MissingValue(decl.short.unwrap_or("?")));
        }
        if !decl.implemented && !strict {
            println!("WARNING: option: {arg} is not implemented");
        }
        if m.takes_next {
            i += 1;
            set_string(&mut values, m.opt, args[i].clone());
            mark(&mut recognized, i);
        } else {
            match m.opt.kind() {
                OptKind::Boolean => {
                    let idx = DECLS.iter().position(|d| d.opt == m.opt).unwrap_or(0);
                    values[idx] = OptValue::Flag(true);
                }
                OptKind::Str | OptKind::RepeatedStr => {
                    let eqx = arg.find('=').unwrap_or(0);
                    set_string(&mut values, m.opt, arg[eqx + 1..].to_string());
                }
            }
        }
        i += 1;
        // --args terminates option scanning
        if m.opt == Opt::Args {
            first_non_option = i;
            break;
        }
    }

    // the tail after the first non-option argument is all positional
    if let Some(rec) = recognized.as_deref_mut() {
        for r in rec.iter_mut().skip(first_non_option) {
            *r = true;
        }
    }

    Ok(OptionSet {
        client,
        values,
        arguments: args.to_vec(),
        first_non_option,
    })
}

/// Render the help table: each option's forms, comma separated, aligned
/// in a 22-column field before its description.
pub fn render_option_help() -> String {
    let mut out = String::from("Options:\n");
    for decl in DECLS {
        let mut name = String::new();
        if let Some(short) = decl.short {
            name.push_str(short);
            if let Some(suffix) = decl.short_suffix {
                name.push_str(suffix);
            }
            if decl.long.is_some() {
                name.push_str(", ");
            }
        }
        if let Some(long) = decl.long {
            name.push_str(long);
            if let Some(suffix) = decl.long_suffix {
                name.push_str(suffix);
            }
        }
        let help = decl.help.replace('\n', "\n                          ");
        out.push_str(&format!("  {name:<22}  {help}\n"));
    }
    out.push_str("\nFILE may contain spaces but not shell metacharacters.\n");
    out
}
