//! Environment-based configuration loading.
//!
//! A `.env` file in the working directory is honoured when present; real
//! environment variables take precedence over it.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use vocalis_core::config::{
    AppConfig, AudioToolSettings, DEFAULT_FFMPEG_BIN, DEFAULT_FFPROBE_BIN, DEFAULT_MODELS_DIR,
    DEFAULT_POLL_TIMEOUT, DEFAULT_SYNTHESIS_CONNECT_TIMEOUT, DEFAULT_SYNTHESIS_TIMEOUT,
    DEFAULT_TELEGRAM_API_URL, StorageSettings, SynthesisSettings, TelegramSettings,
};
use vocalis_core::error::{Result, VocalisError};
use vocalis_core::model::MAX_MODELS;

pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
pub const POLL_TIMEOUT_SECS: &str = "POLL_TIMEOUT_SECS";
pub const GRPC_SERVER_HOST: &str = "GRPC_SERVER_HOST";
pub const GRPC_SERVER_PORT: &str = "GRPC_SERVER_PORT";
pub const SYNTHESIS_TIMEOUT_SECS: &str = "SYNTHESIS_TIMEOUT_SECS";
pub const SYNTHESIS_CONNECT_TIMEOUT_SECS: &str = "SYNTHESIS_CONNECT_TIMEOUT_SECS";
pub const DB_PATH: &str = "DB_PATH";
pub const MODELS_DIR: &str = "MODELS_DIR";
pub const MAX_MODELS_VAR: &str = "MAX_MODELS";
pub const FFMPEG_BIN: &str = "FFMPEG_BIN";
pub const FFPROBE_BIN: &str = "FFPROBE_BIN";

/// Builds an [`AppConfig`] from key lookups.
///
/// The lookup is injected so tests can feed a map instead of mutating the
/// process environment.
pub struct EnvConfigLoader<F> {
    lookup: F,
}

impl EnvConfigLoader<fn(&str) -> Option<String>> {
    /// Loader over the process environment, after reading `.env` if present.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => debug!(error = %e, "Ignoring unreadable .env"),
        }
        Self {
            lookup: |key: &str| std::env::var(key).ok(),
        }
    }
}

impl<F> EnvConfigLoader<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn from_lookup(lookup: F) -> Self {
        Self { lookup }
    }

    /// # Errors
    ///
    /// `Config` when a required variable is missing or empty, or a numeric
    /// variable does not parse.
    pub fn load(&self) -> Result<AppConfig> {
        let telegram = TelegramSettings {
            token: self.required(TELEGRAM_TOKEN)?,
            api_url: self
                .optional(TELEGRAM_API_URL)
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            poll_timeout: self.seconds(POLL_TIMEOUT_SECS, DEFAULT_POLL_TIMEOUT)?,
        };

        let synthesis = SynthesisSettings {
            host: self.required(GRPC_SERVER_HOST)?,
            port: parse_value(GRPC_SERVER_PORT, &self.required(GRPC_SERVER_PORT)?)?,
            request_timeout: self.seconds(SYNTHESIS_TIMEOUT_SECS, DEFAULT_SYNTHESIS_TIMEOUT)?,
            connect_timeout: self.seconds(
                SYNTHESIS_CONNECT_TIMEOUT_SECS,
                DEFAULT_SYNTHESIS_CONNECT_TIMEOUT,
            )?,
        };

        let storage = StorageSettings {
            database_path: PathBuf::from(self.required(DB_PATH)?),
            models_dir: PathBuf::from(
                self.optional(MODELS_DIR)
                    .unwrap_or_else(|| DEFAULT_MODELS_DIR.to_string()),
            ),
        };

        let audio = AudioToolSettings {
            ffmpeg_bin: self
                .optional(FFMPEG_BIN)
                .unwrap_or_else(|| DEFAULT_FFMPEG_BIN.to_string()),
            ffprobe_bin: self
                .optional(FFPROBE_BIN)
                .unwrap_or_else(|| DEFAULT_FFPROBE_BIN.to_string()),
        };

        let max_models = match self.optional(MAX_MODELS_VAR) {
            Some(raw) => parse_value(MAX_MODELS_VAR, &raw)?,
            None => MAX_MODELS,
        };
        if max_models == 0 {
            return Err(VocalisError::config(format!("{MAX_MODELS_VAR} must be at least 1")));
        }

        Ok(AppConfig {
            telegram,
            synthesis,
            storage,
            audio,
            max_models,
        })
    }

    /// Trimmed, non-empty value of `key`.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .ok_or_else(|| VocalisError::config(format!("{key} must be set")))
    }

    fn seconds(&self, key: &str, default: Duration) -> Result<Duration> {
        match self.optional(key) {
            Some(raw) => parse_value(key, &raw).map(Duration::from_secs),
            None => Ok(default),
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| VocalisError::config(format!("{key}={raw:?} is invalid: {e}")))
}
