//! Application configuration model.

use crate::model::MAX_MODELS;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_MODELS_DIR: &str = "voices";
pub const DEFAULT_SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(100);
pub const DEFAULT_SYNTHESIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";
pub const DEFAULT_FFPROBE_BIN: &str = "ffprobe";

/// Chat transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    /// Bot token; also the access token for file downloads.
    pub token: String,
    pub api_url: String,
    /// Long-poll timeout for `getUpdates`.
    pub poll_timeout: Duration,
}

/// Synthesis service endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisSettings {
    pub host: String,
    pub port: u16,
    /// Bound on a single synthesis call.
    pub request_timeout: Duration,
    /// Bound on establishing the connection.
    pub connect_timeout: Duration,
}

impl SynthesisSettings {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Local storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub database_path: PathBuf,
    /// Root of the per-user model blob directories.
    pub models_dir: PathBuf,
}

/// External audio tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioToolSettings {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
}

impl Default for AudioToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_bin: DEFAULT_FFMPEG_BIN.to_string(),
            ffprobe_bin: DEFAULT_FFPROBE_BIN.to_string(),
        }
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub telegram: TelegramSettings,
    pub synthesis: SynthesisSettings,
    pub storage: StorageSettings,
    pub audio: AudioToolSettings,
    pub max_models: usize,
}

impl AppConfig {
    /// Configuration with every optional value at its default.
    pub fn with_defaults(
        token: impl Into<String>,
        synthesis_host: impl Into<String>,
        synthesis_port: u16,
        database_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            telegram: TelegramSettings {
                token: token.into(),
                api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
                poll_timeout: DEFAULT_POLL_TIMEOUT,
            },
            synthesis: SynthesisSettings {
                host: synthesis_host.into(),
                port: synthesis_port,
                request_timeout: DEFAULT_SYNTHESIS_TIMEOUT,
                connect_timeout: DEFAULT_SYNTHESIS_CONNECT_TIMEOUT,
            },
            storage: StorageSettings {
                database_path: database_path.into(),
                models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            },
            audio: AudioToolSettings::default(),
            max_models: MAX_MODELS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::with_defaults("token", "localhost", 50051, "vocalis.db");
        assert_eq!(config.max_models, 5);
        assert_eq!(config.synthesis.request_timeout, Duration::from_secs(100));
        assert_eq!(config.synthesis.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.synthesis.endpoint(), "http://localhost:50051");
        assert_eq!(config.storage.models_dir, PathBuf::from("voices"));
    }
}
