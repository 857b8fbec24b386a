//! Logging setup for the web index CLI.
//!
//! `--verbose` enables debug output for the web index crates, `--quiet`
//! limits output to errors, and otherwise `RUST_LOG` is honored with an info
//! fallback.

use fob_web_index::logging::LogLevel;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives enabling `level` for the web index crates
pub fn directives(level: LogLevel) -> String {
    format!("fob_web_index={level},fob_web_index_cli={level}")
}

/// Build the filter for the given verbosity flags
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if !verbose && !quiet {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::new(directives(LogLevel::from_flags(verbose, quiet)))
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup. Colors are disabled by `no_color` or when the
/// terminal does not support them.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

/// Check if colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal is asked.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stdout().features().colors_supported()
}
