use thiserror::Error;

mod client;
mod logging;

pub use self::client::{Api, Cache, Config, Credentials, Retry};
pub use self::logging::{Logging, LoggingStyle};

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ConfigError;
