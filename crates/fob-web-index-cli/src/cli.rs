//! Command-line interface definition.
//!
//! - `fob-web-index render` - generate the document once
//! - `fob-web-index watch` - generate, then regenerate whenever the build
//!   manifest or template changes

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Fob web index - HTML entry document generator
#[derive(Parser, Debug)]
#[command(
    name = "fob-web-index",
    version,
    about = "Generate the HTML entry document for a build",
    long_about = "Reads a JSON build manifest and writes an index.html that references every\n\
                  web-indexed script bundle and injected stylesheet, in order."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the web index once
    Render(RenderArgs),

    /// Generate the web index and regenerate it on every change
    ///
    /// The build manifest and the template file (if any) are watched. A
    /// failed initial generation is fatal; later failures are logged and the
    /// previous document is kept.
    Watch(WatchArgs),
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// JSON build manifest listing bundles and injected stylesheets
    #[arg(short, long, value_name = "FILE")]
    pub manifest: PathBuf,

    /// Config file (default: web-index.config.json or web-index.config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the document is written to (default: dist)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Document filename inside the output directory (default: index.html)
    #[arg(short, long, value_name = "FILE")]
    pub out_file: Option<PathBuf>,

    /// URL prefix for asset paths (default: /)
    #[arg(short, long, value_name = "PATH")]
    pub public_path: Option<String>,

    /// Jinja template file
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub index: IndexArgs,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    /// Ignore repeated changes to the same file within this window
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub debounce_ms: u64,
}
