use error_stack::{Result, ResultExt};
use std::io::IsTerminal;
use thiserror::Error;
use tracing::{level_filters::LevelFilter, Subscriber};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan, EnvFilter, Layer};

use crate::config::{Logging, LoggingStyle};

#[derive(Debug, Error)]
#[error("Failed to initialize tracing")]
pub struct LoggingInitError;

/// Installs the global subscriber. Logs go to stderr so that command
/// output on stdout stays clean.
pub fn init(config: &Logging) -> Result<(), LoggingInitError> {
    let registry = tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(console_layer(config));

    tracing::subscriber::set_global_default(registry)
        .change_context(LoggingInitError)
        .attach_printable("already initialized tracing")?;

    if !config.targets.is_empty() && std::env::var("RUST_LOG").is_ok() {
        tracing::warn!("Both `RUST_LOG` and `POSTHUB_LOGGING_TARGETS` are set, using the latter");
    }

    Ok(())
}

/// Routes logs through the test harness so they only show up for
/// failing tests. Safe to call more than once.
pub fn init_for_tests() {
    let layer = tracing_subscriber::fmt::layer()
        .with_test_writer()
        .with_filter(make_env_filter(
            &std::env::var("RUST_LOG").unwrap_or_default(),
            LevelFilter::DEBUG,
        ));

    let registry = tracing_subscriber::registry().with(layer);
    tracing::subscriber::set_global_default(registry).ok();
}

fn console_layer<S>(config: &Logging) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let targets = if config.targets.is_empty() {
        std::env::var("RUST_LOG").unwrap_or_default()
    } else {
        config.targets.clone()
    };
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = make_env_filter(&targets, default_level);

    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    match config.style {
        LoggingStyle::Compact => layer.compact().with_filter(filter).boxed(),
        LoggingStyle::Full => layer.with_filter(filter).boxed(),
        LoggingStyle::Pretty => layer.pretty().with_filter(filter).boxed(),
    }
}

fn make_env_filter(targets: &str, default_level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(targets)
}
