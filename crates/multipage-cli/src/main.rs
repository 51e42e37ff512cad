//! `multipage` binary entry point.

use clap::Parser;
use miette::Result;
use multipage_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse_from(cli::normalize_args(std::env::args_os()));

    logger::init_logger(args.global.verbose, args.global.quiet, args.global.no_color);
    ui::init_colors(args.global.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args, &args.global).await,
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args, &args.global).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args, &args.global),
        cli::Command::Resolve(resolve_args) => commands::resolve_execute(resolve_args),
    };

    result.map_err(error::cli_error_to_miette)
}
