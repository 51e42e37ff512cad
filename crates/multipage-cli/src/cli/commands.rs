use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::MergeArg;

/// Available multipage subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every page (the default when no subcommand is given)
    ///
    /// Runs one bundler process per strategy, or per page with `--merge page`,
    /// all in parallel, then assembles the outputs into the output directory.
    /// Unrecognized arguments are forwarded to the bundler.
    Build(BuildArgs),

    /// Start the development server
    ///
    /// Serves every page at `/<page>` from its template with the entry file
    /// and defines injected. Other paths are served from the project root.
    Dev(DevArgs),

    /// Validate configuration and list the planned pages
    Check(CheckArgs),

    /// Print the bundler config for one build unit as JSON
    ///
    /// Meant to be called from the bundler's own config file while it runs
    /// under `multipage build`.
    Resolve(ResolveArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Only build these strategies
    ///
    /// Examples:
    ///   multipage build --strategy mobile
    ///   multipage build --strategy default,mobile
    #[arg(short, long, value_delimiter = ',', value_name = "NAME")]
    pub strategy: Vec<String>,

    /// Only build this page, in isolation
    #[arg(short, long, value_name = "PAGE")]
    pub page: Option<String>,

    /// Override the configured merge mode
    #[arg(short, long, value_enum, value_name = "MODE")]
    pub merge: Option<MergeArg>,

    /// Per-unit timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Arguments passed through to the bundler
    #[arg(last = true, value_name = "ARGS")]
    pub forward: Vec<String>,
}

/// Arguments for the dev command (development server)
#[derive(Args, Debug)]
pub struct DevArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "5173", value_name = "PORT")]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", value_name = "HOST")]
    pub host: String,

    /// Only serve pages of these strategies
    #[arg(short, long, value_delimiter = ',', value_name = "NAME")]
    pub strategy: Vec<String>,

    /// Open the browser once the server is up
    #[arg(long)]
    pub open: bool,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the check command (configuration validation)
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Unit manifest to read
    ///
    /// Defaults to the path in MULTIPAGE_BUILD_UNIT, which `multipage build`
    /// sets for every bundler process it starts.
    #[arg(short, long, value_name = "FILE")]
    pub unit: Option<PathBuf>,

    /// Print the whole manifest instead of only the bundler config
    #[arg(long)]
    pub manifest: bool,
}
