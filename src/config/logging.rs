use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Logging {
    /// **Environment variable**: `POSTHUB_LOGGING_STYLE`
    ///
    /// There are three styles to choose:
    /// - `compact` - compacts logs but it is readable enough
    /// - `full` - default formatter from [`tracing_subscriber`].
    /// - `pretty` - makes logs pretty
    ///
    /// The default value is `compact`, if not set.
    pub style: LoggingStyle,

    /// **Environment variable**: `POSTHUB_LOGGING_TARGETS` or `RUST_LOG`
    ///
    /// Filters logging events with the use of directives. By default
    /// only warnings and errors reach the terminal, so that command
    /// output stays readable.
    pub targets: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingStyle {
    #[default]
    Compact,
    Full,
    Pretty,
}
