use error_stack::{Report, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::{extras::validate_http_url, Validate, ValidateError};

use super::{ConfigError, Logging};
use crate::util::figment::FigmentErrorAttachable;

/// Configuration of the PostHub client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api: Api,
    pub retry: Retry,
    pub cache: Cache,
    pub credentials: Credentials,
    pub logging: Logging,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Api {
    /// **Environment variable**: `POSTHUB_API_URL` or `API_URL`
    ///
    /// Base URL of the PostHub REST API.
    ///
    /// The default value is `http://localhost:8000`, if not set.
    pub url: String,

    /// **Environment variable**: `POSTHUB_API_TIMEOUT_SECS`
    ///
    /// The default value is `10`, if not set.
    pub timeout_secs: u64,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".into(),
            timeout_secs: 10,
        }
    }
}

impl Api {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry policy of read requests. Mutations are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Retry {
    /// **Environment variable**: `POSTHUB_RETRY_MAX_RETRIES`
    ///
    /// The default value is `2`, if not set.
    pub max_retries: usize,

    /// **Environment variable**: `POSTHUB_RETRY_BASE_DELAY_MS`
    ///
    /// Delay before the first retry, doubled on every next one.
    ///
    /// The default value is `1000`, if not set.
    pub base_delay_ms: u64,

    /// **Environment variable**: `POSTHUB_RETRY_MAX_DELAY_MS`
    ///
    /// The default value is `5000`, if not set.
    pub max_delay_ms: u64,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1000,
            max_delay_ms: 5000,
        }
    }
}

impl Retry {
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Cache {
    /// **Environment variable**: `POSTHUB_CACHE_STALE_SECS`
    ///
    /// How long fetched posts and users are considered fresh.
    ///
    /// The default value is `30`, if not set.
    pub stale_secs: u64,

    /// **Environment variable**: `POSTHUB_CACHE_POSTS_STALE_SECS`
    ///
    /// Freshness of post lists (the feed) which change more often.
    ///
    /// The default value is `15`, if not set.
    pub posts_stale_secs: u64,

    /// **Environment variable**: `POSTHUB_CACHE_GC_SECS`
    ///
    /// How long stale data is kept around to be shown when
    /// refetching fails.
    ///
    /// The default value is `300`, if not set.
    pub gc_secs: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            stale_secs: 30,
            posts_stale_secs: 15,
            gc_secs: 300,
        }
    }
}

impl Cache {
    #[must_use]
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }

    #[must_use]
    pub fn posts_stale_time(&self) -> Duration {
        Duration::from_secs(self.posts_stale_secs)
    }

    #[must_use]
    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Credentials {
    /// **Environment variable**: `POSTHUB_CREDENTIALS_PATH`
    ///
    /// File holding the access token between runs.
    ///
    /// The default value is `<config dir>/posthub/credentials.json`,
    /// if not set.
    pub path: PathBuf,
}

impl Default for Credentials {
    fn default() -> Self {
        let path = dirs::config_dir()
            .map(|dir| dir.join("posthub"))
            .unwrap_or_default()
            .join("credentials.json");

        Self { path }
    }
}

impl Config {
    const DEFAULT_CONFIG_FILE: &'static str = "posthub.toml";

    /// Loads configuration from `.env`, the config file (or the
    /// default `posthub.toml` if it exists) and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        if let Some(file) = file.filter(|file| !file.exists()) {
            return Err(Report::new(ConfigError)
                .attach_printable(format!("config file {} does not exist", file.display())));
        }

        let config = Self::figment(file)
            .extract::<Self>()
            .map_err(|e| Report::new(ConfigError).attach_figment_error(e))?;

        config
            .validate()
            .change_context(ConfigError)
            .attach_printable("configuration has invalid values")?;

        Ok(config)
    }

    /// Creates a default [`Figment`](figment::Figment) object to load
    /// client configuration. Exposed separately for testing.
    pub(crate) fn figment(file: Option<&Path>) -> figment::Figment {
        use figment::{
            providers::{Env, Format, Serialized, Toml},
            Figment,
        };

        let file = file.unwrap_or_else(|| Path::new(Self::DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            // Environment variable aliases
            .merge(Env::raw().only(&["API_URL"]).map(|_| "api.url".into()))
            // Every config section is a single word, so the first
            // underscore splits the section from the field name.
            .merge(Env::prefixed("POSTHUB_").map(|v| v.as_str().replacen('_', ".", 1).into()))
    }
}

impl Validate for Config {
    fn validate(&self) -> std::result::Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("api.url", {
            let mut error = ValidateError::msg_builder();
            if !validate_http_url(&self.api.url) {
                error.insert("API URL must be an absolute http(s) URL");
            }
            error.build()
        });
        fields.insert("api.timeout_secs", {
            let mut error = ValidateError::msg_builder();
            if self.api.timeout_secs == 0 {
                error.insert("Request timeout must be greater than zero");
            }
            error.build()
        });
        fields.insert("cache.gc_secs", {
            let mut error = ValidateError::msg_builder();
            if self.cache.gc_secs < self.cache.stale_secs.max(self.cache.posts_stale_secs) {
                error.insert("Cache must keep entries at least as long as they stay fresh");
            }
            error.build()
        });
        fields.build().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults() {
        Jail::expect_with(|_| {
            let config: Config = Config::figment(None).extract()?;
            assert_eq!(config.api.url, "http://localhost:8000");
            assert_eq!(config.api.timeout(), Duration::from_secs(10));
            assert_eq!(config.retry, Retry::default());
            assert_eq!(config.cache.stale_secs, 30);
            assert_eq!(config.cache.gc_secs, 300);
            assert!(config.credentials.path.ends_with("credentials.json"));
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn env_vars() {
        Jail::expect_with(|jail| {
            jail.set_env("POSTHUB_API_URL", "https://api.posthub.test");
            jail.set_env("POSTHUB_API_TIMEOUT_SECS", "3");
            jail.set_env("POSTHUB_RETRY_MAX_RETRIES", "5");
            jail.set_env("POSTHUB_RETRY_BASE_DELAY_MS", "10");
            jail.set_env("POSTHUB_CACHE_POSTS_STALE_SECS", "1");
            jail.set_env("POSTHUB_CREDENTIALS_PATH", "/tmp/token.json");
            jail.set_env("POSTHUB_LOGGING_STYLE", "pretty");

            let config: Config = Config::figment(None).extract()?;
            assert_eq!(config.api.url, "https://api.posthub.test");
            assert_eq!(config.api.timeout_secs, 3);
            assert_eq!(config.retry.max_retries, 5);
            assert_eq!(config.retry.base_delay(), Duration::from_millis(10));
            assert_eq!(config.cache.posts_stale_secs, 1);
            assert_eq!(config.credentials.path, PathBuf::from("/tmp/token.json"));
            assert_eq!(config.logging.style, crate::config::LoggingStyle::Pretty);
            Ok(())
        });
    }

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("API_URL", "http://alias.test");
            let config: Config = Config::figment(None).extract()?;
            assert_eq!(config.api.url, "http://alias.test");

            // the prefixed variable has the last word
            jail.set_env("POSTHUB_API_URL", "http://prefixed.test");
            let config: Config = Config::figment(None).extract()?;
            assert_eq!(config.api.url, "http://prefixed.test");
            Ok(())
        });
    }

    #[test]
    fn config_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "posthub.toml",
                r#"
                [api]
                url = "http://from-file.test"

                [cache]
                stale_secs = 60
                "#,
            )?;

            let config: Config = Config::figment(None).extract()?;
            assert_eq!(config.api.url, "http://from-file.test");
            assert_eq!(config.cache.stale_secs, 60);
            assert_eq!(config.api.timeout_secs, 10);
            Ok(())
        });
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = Config::default();
        config.api.url = "localhost:8000".into();
        config.api.timeout_secs = 0;
        config.cache.gc_secs = 1;

        let error = config.validate().unwrap_err();
        assert!(error.field("api.url").is_some());
        assert!(error.field("api.timeout_secs").is_some());
        assert!(error.field("cache.gc_secs").is_some());
    }
}
