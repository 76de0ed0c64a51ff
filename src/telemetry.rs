//! Tracing subscriber setup.

use crate::config::StoryConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "HUBBLEDS_LOG";

#[derive(Debug, Error)]
#[error("failed to initialize tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Install a formatting subscriber.
///
/// `HUBBLEDS_LOG` wins over the level derived from `config`. Fails if a
/// global subscriber is already set.
pub fn init(config: &StoryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| TelemetryError(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        let config = StoryConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
