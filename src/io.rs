//! Status output.

use log::LevelFilter;

/// How much non-critical status output to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Messages,
    Diagnostics,
}

impl Verbosity {
    /// Whether status messages should be printed.
    pub fn print_messages(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Most verbose log level to pass through at this verbosity.
    ///
    /// Warnings are always shown.
    pub fn log_level(&self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Warn,
            Self::Messages => LevelFilter::Info,
            Self::Diagnostics => LevelFilter::Debug,
        }
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::Quiet
    }
}

/// Installs a logger writing to standard error with a level set by the
/// given verbosity. Only the first call has any effect.
#[cfg(feature = "cli")]
pub fn init_logging(verbosity: Verbosity) {
    let _ = env_logger::Builder::new()
        .filter_level(verbosity.log_level())
        .format_timestamp(None)
        .try_init();
}
