//! Application settings configuration
//!
//! Defines probe timeouts, the request identity, and the default target.

use crate::utils::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Maven artifact the probe targets when no URL is given
pub const DEFAULT_TARGET: &str =
    "https://maven.picovoice.ai/ai/picovoice/cheetah-android/2.0.1/cheetah-android-2.0.1.pom";

/// Probe settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_target")]
    pub default_target: String,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_handshake_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("tls-probe/{}", env!("CARGO_PKG_VERSION"))
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            handshake_timeout_secs: default_handshake_timeout(),
            read_timeout_secs: default_read_timeout(),
            user_agent: default_user_agent(),
            default_target: default_target(),
        }
    }
}

impl ProbeSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Reject settings that would make every probe time out immediately
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("probe.connect_timeout_secs", self.connect_timeout_secs),
            ("probe.handshake_timeout_secs", self.handshake_timeout_secs),
            ("probe.read_timeout_secs", self.read_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "timeout must be at least one second".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub probe: ProbeSettings,
}

impl Settings {
    /// Load settings from the default config file
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        settings.probe.validate()?;
        Ok(settings)
    }
}
