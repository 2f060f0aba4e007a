//! Structured logging setup.
//!
//! Logs always go to stderr so stdout stays machine-readable. The
//! `FITFRAME_LOG` environment variable takes an `EnvFilter` directive and
//! overrides the verbosity flags.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "FITFRAME_LOG";

/// Logging options gathered from the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConfig {
    pub verbose: u8,
    pub quiet: bool,
    pub json: bool,
}

impl LogConfig {
    /// Default filter directive for the chosen verbosity.
    pub fn default_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: &LogConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
