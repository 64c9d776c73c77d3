//! Configuration module for loading TOML config files.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::DebateError;
use crate::participant::Debaters;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub debate: DebateSettings,
    pub debaters: DebatersConfig,
}

/// Connection settings for the OpenAI-compatible provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_base: String,
    /// Usually supplied through `OPENAI_API_KEY` rather than the file.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Needed for some self-hosted endpoints with self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.8,
            request_timeout_secs: 120,
            connect_timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Pacing and time-budget settings for the scheduler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebateSettings {
    /// Default wall-clock budget of a run.
    pub time_budget_secs: u64,
    /// Delay before the first turn.
    pub opening_delay_ms: u64,
    /// Delay between committed turns.
    pub pacing_delay_ms: u64,
    /// Length of one countdown tick; `time_left` drops by one per tick.
    pub tick_ms: u64,
    /// Abort a single provider call after this long. Unset means the call
    /// is bounded only by the transport timeout.
    pub turn_timeout_secs: Option<u64>,
    /// Keep ticking the countdown after the debate stops (while the
    /// summary is generated) instead of freezing it.
    pub countdown_during_summary: bool,
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            time_budget_secs: 120,
            opening_delay_ms: 500,
            pacing_delay_ms: 1500,
            tick_ms: 1000,
            turn_timeout_secs: None,
            countdown_during_summary: false,
        }
    }
}

impl DebateSettings {
    pub fn opening_delay(&self) -> Duration {
        Duration::from_millis(self.opening_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout_secs.map(Duration::from_secs)
    }
}

/// Debater display names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebatersConfig {
    pub name_a: String,
    pub name_b: String,
}

impl Default for DebatersConfig {
    fn default() -> Self {
        Self {
            name_a: "Logos".to_string(),
            name_b: "Pathos".to_string(),
        }
    }
}

impl DebatersConfig {
    pub fn debaters(&self) -> Debaters {
        Debaters::new(&self.name_a, &self.name_b)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| DebateError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, DebateError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| DebateError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), DebateError> {
        if self.debate.tick_ms == 0 {
            return Err(DebateError::ConfigError(
                "debate.tick_ms must be greater than zero".to_string(),
            ));
        }
        if self.debate.turn_timeout_secs == Some(0) {
            return Err(DebateError::ConfigError(
                "debate.turn_timeout_secs must be greater than zero when set".to_string(),
            ));
        }
        self.debaters.debaters().validate()
    }
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    Config::default()
}
