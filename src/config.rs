//! Configuration surface consumed by the pipeline.
//!
//! The core consumes configuration, it never produces it: the hosting process
//! decides where the values come from (a `.env` file, container environment,
//! secrets manager) and either builds a [`Config`] directly or calls
//! [`Config::from_env`].
//!
//! # Environment variables
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `YOMU_SERVER_URL` | Suwayomi server endpoint | required |
//! | `YOMU_API_TOKEN` | bearer credential | required |
//! | `YOMU_ALLOW_NSFW` | adult-content default for searches | `false` |
//! | `YOMU_BATCH_SIZE` | chapter ids per download submission | `50` |

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Runtime configuration for the search/download pipeline.
///
/// Everything except the endpoint and credential has a sensible default; the
/// tunables exist so tests and unusual deployments can tighten them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Suwayomi server, without a trailing slash.
    pub server_url: Url,
    /// Bearer credential sent with every request.
    pub api_token: String,
    /// Whether adult-flagged sources are included in searches by default.
    pub allow_nsfw: bool,
    /// Maximum chapter ids per download submission batch.
    pub batch_size: usize,
    /// Delay between launching successive per-source search calls.
    pub dispatch_delay: Duration,
    /// Delay between successive download batch submissions.
    pub batch_delay: Duration,
    /// How long a selection session waits for the user before timing out.
    pub selection_deadline: Duration,
    /// Interval between status poller ticks.
    pub poll_interval: Duration,
    /// Per-query timeout for the status poller, shorter than the interval.
    pub poll_timeout: Duration,
    /// Timeout applied to each API request.
    pub request_timeout: Duration,
    /// Retry attempts for transient request failures.
    pub max_retries: u32,
}

impl Config {
    /// Builds a configuration from the required endpoint and credential,
    /// leaving every tunable at its default.
    pub fn new(server_url: Url, api_token: impl Into<String>) -> Self {
        Self {
            server_url,
            api_token: api_token.into(),
            allow_nsfw: false,
            batch_size: 50,
            dispatch_delay: Duration::from_millis(300),
            batch_delay: Duration::from_millis(500),
            selection_deadline: Duration::from_secs(180),
            poll_interval: Duration::from_secs(3600),
            poll_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(15),
            max_retries: 3,
        }
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `YOMU_SERVER_URL` or `YOMU_API_TOKEN`
    /// is missing, or if the URL fails validation.
    pub fn from_env() -> Result<Self> {
        let raw_url = env::var("YOMU_SERVER_URL")
            .map_err(|_| Error::validation("YOMU_SERVER_URL is not set"))?;
        let token = env::var("YOMU_API_TOKEN")
            .map_err(|_| Error::validation("YOMU_API_TOKEN is not set"))?;

        let server_url = parse_server_url(&raw_url)?;
        let token = token.trim().trim_matches(['"', '\'']).to_string();
        if token.is_empty() {
            return Err(Error::validation("YOMU_API_TOKEN is empty"));
        }

        let mut config = Self::new(server_url, token);

        if let Ok(v) = env::var("YOMU_ALLOW_NSFW") {
            config.allow_nsfw = matches!(v.trim(), "1" | "true" | "yes");
        }
        if let Ok(v) = env::var("YOMU_BATCH_SIZE") {
            config.batch_size = v
                .trim()
                .parse()
                .map_err(|_| Error::validation(format!("YOMU_BATCH_SIZE is not a number: {v}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks internal consistency of the tunables.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::validation("batch size must be at least 1"));
        }
        if self.poll_timeout >= self.poll_interval {
            return Err(Error::validation(
                "poller query timeout must be shorter than the poll interval",
            ));
        }
        Ok(())
    }

    /// Returns the GraphQL endpoint derived from the server URL.
    pub fn graphql_endpoint(&self) -> String {
        format!("{}/api/graphql", self.server_url.as_str().trim_end_matches('/'))
    }
}

/// Normalizes and validates a server URL taken from the environment.
///
/// People paste quoted values and trailing slashes into `.env` files; both are
/// stripped here rather than rejected.
fn parse_server_url(raw: &str) -> Result<Url> {
    let cleaned = raw.trim().trim_matches(['"', '\'']).trim_end_matches('/');
    if !cleaned.starts_with("http://") && !cleaned.starts_with("https://") {
        return Err(Error::validation(format!(
            "server URL must start with http:// or https://, got: {cleaned}"
        )));
    }
    Url::parse(cleaned).map_err(|e| Error::validation(format!("invalid server URL: {e}")))
}
