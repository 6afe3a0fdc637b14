use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_STORE_URL: &str = "https://api.airtable.com/v0";
const DEFAULT_RECONNECT_ATTEMPTS: u32 = 3;
const DEFAULT_RECONNECT_DELAY_MS: u64 = 2_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Credentials for the conversational-voice provider.
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    pub public_key: String,
    pub assistant_id: String,
}

/// Credentials for the practice-records store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub api_url: String,
    pub base_id: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// None = the provider is not configured; the driver runs the line in
    /// rehearsal mode instead of dialing out.
    pub voice: Option<VoiceConfig>,
    /// None = dry run; call logs are dropped after redaction.
    pub store: Option<StoreConfig>,
    pub max_reconnect_attempts: u32,
    pub reconnect_base_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Credentials come in pairs. A half-configured pair is a mistake we
    /// refuse to guess around.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let voice = match (get("CHAIRSIDE_VOICE_KEY"), get("CHAIRSIDE_ASSISTANT_ID")) {
            (Some(public_key), Some(assistant_id)) => Some(VoiceConfig {
                public_key,
                assistant_id,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("CHAIRSIDE_ASSISTANT_ID")),
            (None, Some(_)) => return Err(ConfigError::Missing("CHAIRSIDE_VOICE_KEY")),
        };

        let store = match (get("CHAIRSIDE_STORE_TOKEN"), get("CHAIRSIDE_STORE_BASE")) {
            (Some(token), Some(base_id)) => Some(StoreConfig {
                api_url: get("CHAIRSIDE_STORE_URL").unwrap_or_else(|| DEFAULT_STORE_URL.to_string()),
                base_id,
                token,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("CHAIRSIDE_STORE_BASE")),
            (None, Some(_)) => return Err(ConfigError::Missing("CHAIRSIDE_STORE_TOKEN")),
        };

        let max_reconnect_attempts = match get("CHAIRSIDE_RECONNECT_ATTEMPTS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "CHAIRSIDE_RECONNECT_ATTEMPTS",
                value: raw,
            })?,
            None => DEFAULT_RECONNECT_ATTEMPTS,
        };

        let reconnect_base_delay = match get("CHAIRSIDE_RECONNECT_DELAY_MS") {
            Some(raw) => {
                let ms: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "CHAIRSIDE_RECONNECT_DELAY_MS",
                    value: raw,
                })?;
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
        };

        Ok(Self {
            voice,
            store,
            max_reconnect_attempts,
            reconnect_base_delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_empty_env_is_a_dry_run() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.voice.is_none());
        assert!(config.store.is_none());
        assert_eq!(config.max_reconnect_attempts, 3);
    }

    #[test]
    fn test_store_pair_with_default_url() {
        let config = Config::from_lookup(lookup(&[
            ("CHAIRSIDE_STORE_TOKEN", "pat-123"),
            ("CHAIRSIDE_STORE_BASE", "appXYZ"),
        ]))
        .unwrap();
        let store = config.store.unwrap();
        assert_eq!(store.api_url, DEFAULT_STORE_URL);
        assert_eq!(store.base_id, "appXYZ");
    }

    #[test]
    fn test_half_configured_store_is_rejected() {
        let err = Config::from_lookup(lookup(&[("CHAIRSIDE_STORE_TOKEN", "pat-123")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CHAIRSIDE_STORE_BASE")));
    }

    #[test]
    fn test_bad_reconnect_attempts_is_rejected() {
        let err =
            Config::from_lookup(lookup(&[("CHAIRSIDE_RECONNECT_ATTEMPTS", "many")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "CHAIRSIDE_RECONNECT_ATTEMPTS",
                ..
            }
        ));
    }

    #[test]
    fn test_reconnect_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CHAIRSIDE_RECONNECT_ATTEMPTS", "5"),
            ("CHAIRSIDE_RECONNECT_DELAY_MS", "500"),
        ]))
        .unwrap();
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.reconnect_base_delay, Duration::from_millis(500));
    }
}
