//! Logging setup on top of `tracing-subscriber`.

use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::errors::GraphError;

/// Configuration of the global tracing subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set (e.g. `info`,
    /// `computational_graph=trace`).
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Switches to JSON output.
    #[must_use]
    pub const fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Builds the filter: `RUST_LOG` wins over the configured level.
    pub fn env_filter(&self) -> Result<EnvFilter, GraphError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| GraphError::Logging(e.to_string()))
    }

    /// Builds a subscriber writing to `writer`, without installing it.
    ///
    /// # Errors
    ///
    /// Fails if the filter directive is invalid.
    pub fn build_subscriber<W>(
        &self,
        writer: W,
    ) -> Result<Box<dyn Subscriber + Send + Sync>, GraphError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter()?)
            .with_writer(writer);
        if self.json {
            Ok(Box::new(builder.json().finish()))
        } else {
            Ok(Box::new(builder.finish()))
        }
    }
}

/// Installs the global tracing subscriber, writing to stdout.
///
/// # Errors
///
/// Fails if the filter directive is invalid or a global subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), GraphError> {
    config
        .build_subscriber(std::io::stdout)?
        .try_init()
        .map_err(|e| GraphError::Logging(e.to_string()))
}
