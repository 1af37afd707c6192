//! Runtime configuration read from environment variables.
//!
//! Every value falls back to the compile-time default of its module when the
//! variable is unset or cannot be parsed.

use std::time::Duration;

use super::anti_spam::{CLIENT_TIMEOUT_SECS, HEARTBEAT_INTERVAL_SECS, MAX_REQUESTS_PER_SECOND};
use super::matchmaking::{PROMPT_TIMEOUT_SECS, STATS_TIMEOUT_MS};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server bind host.
    pub host: String,
    /// Server listen port.
    pub port: u16,
    /// Delay before an unanswered continue prompt counts as "leave". `None` disables it.
    pub prompt_timeout: Option<Duration>,
    /// Upper bound for a single statistics lookup.
    pub stats_timeout: Duration,
    /// Inbound frames tolerated per connection per second.
    pub max_requests_per_second: u32,
    pub heartbeat_interval: Duration,
    pub client_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let prompt_secs = number("PROMPT_TIMEOUT_SECS", PROMPT_TIMEOUT_SECS);
        AppConfig {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: lookup("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            prompt_timeout: (prompt_secs > 0).then(|| Duration::from_secs(prompt_secs)),
            stats_timeout: Duration::from_millis(number("STATS_TIMEOUT_MS", STATS_TIMEOUT_MS)),
            max_requests_per_second: lookup("MAX_REQUESTS_PER_SECOND")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(MAX_REQUESTS_PER_SECOND),
            heartbeat_interval: Duration::from_secs(number(
                "HEARTBEAT_INTERVAL_SECS",
                HEARTBEAT_INTERVAL_SECS,
            )),
            client_timeout: Duration::from_secs(number("CLIENT_TIMEOUT_SECS", CLIENT_TIMEOUT_SECS)),
        }
    }

    /// Socket address tuple for binding.
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.prompt_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.stats_timeout, Duration::from_millis(2000));
        assert_eq!(config.max_requests_per_second, 30);
        assert_eq!(config.bind_addr(), ("127.0.0.1".to_string(), 8080));
    }

    #[test]
    fn overrides_and_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "9000"),
            ("PROMPT_TIMEOUT_SECS", "0"),
            ("STATS_TIMEOUT_MS", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.port, 9000);
        assert_eq!(config.prompt_timeout, None);
        assert_eq!(config.stats_timeout, Duration::from_millis(2000));
    }
}
