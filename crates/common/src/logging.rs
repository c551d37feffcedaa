//! Logging and tracing initialization.
//!
//! Logs go to stderr so the CLI's progress line on stdout stays intact.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Targets raised to `debug` by verbose mode.
pub const BDCLIP_TARGETS: &[&str] = &[
    "bdclip",
    "bdclip_common",
    "bdclip_clip_model",
    "bdclip_compiler",
];

/// Filter directives for the configured level.
///
/// Verbose mode keeps `level` for third-party targets and adds a `debug`
/// directive for each bdclip target.
pub fn filter_directives(level: &str, verbose: bool) -> String {
    let mut directives = level.to_string();
    if verbose {
        for target in BDCLIP_TARGETS {
            directives.push_str(&format!(",{target}=debug"));
        }
    }
    directives
}

/// Install the global subscriber. `RUST_LOG` wins over the config when set.
///
/// Only the first call installs anything.
pub fn init_logging(config: &LoggingConfig, verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level, verbose)));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if config.json {
        let subscriber = builder.json().with_current_span(false).finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = builder.with_target(verbose).without_time().finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default(), false);
}
