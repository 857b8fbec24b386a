//! Fob web index CLI.
//!
//! Parses arguments, initializes logging and dispatches to the `render` or
//! `watch` command.

use clap::Parser;
use fob_web_index_cli::{cli, commands, error, logger};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Render(render_args) => commands::render_execute(render_args).await,
        cli::Command::Watch(watch_args) => commands::watch_execute(watch_args).await,
    };

    // Web index errors carry their own diagnostics; everything else gets a plain report
    result.map_err(error::cli_error_to_miette)
}
