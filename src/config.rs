use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Admin API address, `host:port`.
    pub address: String,
    /// Per-call timeout. Zero waits indefinitely.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub tls: bool,
    pub tls_insecure: bool,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout = match env::var("ADMIN_API_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|e| ConfigError::Invalid {
                    var: "ADMIN_API_TIMEOUT_SECS",
                    value: raw.clone(),
                    reason: format!("{}", e),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(5),
        };

        Ok(Self {
            address: env::var("ADMIN_API_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1:4301".to_string()),
            timeout,
            tls: env_flag("ADMIN_API_TLS"),
            tls_insecure: env_flag("ADMIN_API_TLS_INSECURE"),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:4301".to_string(),
            timeout: Duration::from_secs(5),
            tls: false,
            tls_insecure: false,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

fn env_flag(var: &str) -> bool {
    matches!(
        env::var(var).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes")
    )
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(de)?))
    }
}
