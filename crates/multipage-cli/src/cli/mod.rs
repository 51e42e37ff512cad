//! Command-line interface definition.
//!
//! # Command Structure
//!
//! - `multipage build` - Build every page through the configured bundler (the default)
//! - `multipage dev` - Serve pages from their templates during development
//! - `multipage check` - Validate configuration and list the planned pages
//! - `multipage resolve` - Print a build unit's bundler config (used by the child bundler)
//!
//! Arguments `build` does not recognize are forwarded to the bundler, so
//! `multipage --mode staging` runs `multipage build -- --mode staging`.

mod commands;
pub mod enums;
mod tests;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser};

pub use commands::{BuildArgs, CheckArgs, Command, DevArgs, ResolveArgs};
pub use enums::MergeArg;

/// multipage - multi-page builds on top of a single-page bundler
#[derive(Parser, Debug)]
#[command(
    name = "multipage",
    version,
    about = "Multi-page builds on top of a single-page bundler",
    long_about = "multipage discovers page entry files, groups them into build strategies and\n\
                  runs one bundler process per strategy (or per page), then assembles the\n\
                  outputs into a single tree."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging and show bundler output
    #[arg(short, long, visible_alias = "debug", global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Change to this directory before doing anything else
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

const HELP_FLAGS: &[&str] = &["-h", "--help", "-V", "--version"];

/// Rewrite raw arguments into the shape clap expects.
///
/// Inserts `build` when no subcommand is named and, for `build`, moves every
/// argument it does not define behind `--` so it reaches the bundler.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.is_empty() {
        return args;
    }

    let command = Cli::command();
    let subcommands: Vec<String> = command
        .get_subcommands()
        .flat_map(|sub| std::iter::once(sub.get_name()).chain(sub.get_all_aliases()))
        .map(str::to_string)
        .chain(std::iter::once("help".to_string()))
        .collect();

    let known = KnownFlags::for_build(&command);
    let build_at = match find_subcommand(&args, &subcommands, &known) {
        Some(index) if args[index] == "build" => index,
        Some(_) => return args,
        None => {
            // Bare `multipage --help` describes the whole tool.
            if args.len() == 2 && args[1].to_str().is_some_and(|a| HELP_FLAGS.contains(&a)) {
                return args;
            }
            args.insert(1, OsString::from("build"));
            1
        }
    };

    let mut kept: Vec<OsString> = args[..=build_at].to_vec();
    let mut forwarded: Vec<OsString> = Vec::new();
    let rest_end = args.iter().position(|arg| arg == "--").unwrap_or(args.len());

    let mut iter = args[build_at + 1..rest_end].iter().peekable();
    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str() else {
            forwarded.push(arg.clone());
            continue;
        };
        match known.lookup(text) {
            Some(takes_value) => {
                kept.push(arg.clone());
                if takes_value {
                    if let Some(value) = iter.next() {
                        kept.push(value.clone());
                    }
                }
            }
            None => {
                forwarded.push(arg.clone());
                // `--mode staging`: the value travels with its flag.
                if text.starts_with('-') && !text.contains('=') {
                    if let Some(value) = iter.next_if(|next| !next.to_string_lossy().starts_with('-')) {
                        forwarded.push(value.clone());
                    }
                }
            }
        }
    }

    // Args the user already placed after `--`.
    if rest_end < args.len() {
        forwarded.extend(args[rest_end + 1..].iter().cloned());
    }

    if !forwarded.is_empty() {
        kept.push(OsString::from("--"));
        kept.extend(forwarded);
    }
    kept
}

/// Index of the first argument naming a subcommand, skipping flag values.
fn find_subcommand(args: &[OsString], subcommands: &[String], known: &KnownFlags) -> Option<usize> {
    let mut index = 1;
    while index < args.len() {
        let Some(text) = args[index].to_str() else {
            index += 1;
            continue;
        };
        if text == "--" {
            return None;
        }
        if subcommands.iter().any(|name| name == text) {
            return Some(index);
        }
        index += match known.lookup(text) {
            Some(true) => 2,
            _ => 1,
        };
    }
    None
}

/// Long and short flags `build` understands.
struct KnownFlags {
    /// Flag spelling and whether it takes a separate value.
    flags: Vec<(String, bool)>,
}

impl KnownFlags {
    fn for_build(command: &clap::Command) -> Self {
        let mut flags: Vec<(String, bool)> = HELP_FLAGS
            .iter()
            .map(|flag| (flag.to_string(), false))
            .collect();

        let build_args = command
            .find_subcommand("build")
            .into_iter()
            .flat_map(|build| build.get_arguments());
        for arg in command.get_arguments().chain(build_args) {
            let takes_value = arg.get_action().takes_values();
            for long in arg.get_long().into_iter().chain(arg.get_all_aliases().unwrap_or_default()) {
                flags.push((format!("--{long}"), takes_value));
            }
            for short in arg
                .get_short()
                .into_iter()
                .chain(arg.get_all_short_aliases().unwrap_or_default())
            {
                flags.push((format!("-{short}"), takes_value));
            }
        }
        Self { flags }
    }

    /// `Some(takes_value)` when `arg` is a known flag. `--flag=value` never
    /// takes a separate value.
    fn lookup(&self, arg: &str) -> Option<bool> {
        let (name, inline) = match arg.split_once('=') {
            Some((name, _)) => (name, true),
            None => (arg, false),
        };
        self.flags
            .iter()
            .find(|(flag, _)| flag == name)
            .map(|(_, takes_value)| *takes_value && !inline)
    }
}
