//! Logging setup for the command-line tool
//!
//! The library only emits `tracing` events; installing a subscriber is left to binaries.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Info and above
    #[default]
    Normal,
    /// Debug and above, including skipped frame diagnostics
    Verbose,
    /// Everything, one event per decoded or skipped frame
    Trace,
}

impl Verbosity {
    /// `debug` is the number of times `--debug` was given; it wins over `quiet`
    pub fn from_flags(debug: u8, quiet: bool) -> Self {
        match (debug, quiet) {
            (0, true) => Verbosity::Quiet,
            (0, false) => Verbosity::Normal,
            (1, _) => Verbosity::Verbose,
            _ => Verbosity::Trace,
        }
    }

    pub fn to_level(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Install a stderr subscriber. `RUST_LOG` takes precedence over `verbosity`.
pub fn init_logging(verbosity: Verbosity) {
    let default_filter = format!("ardulog={}", verbosity.to_level());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false),
    );

    // A subscriber may already be installed, e.g. when called twice in tests
    let _ = subscriber.try_init();
}
