use super::metadata::AudioMetadata;
use crate::error::Result;
use async_trait::async_trait;

/// Narrow interface over an external probe/transcode tool.
///
/// Production code shells out to `ffprobe`/`ffmpeg`; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait AudioToolkit: Send + Sync {
    /// Inspects the first audio stream.
    ///
    /// Inspection is best-effort: any failure yields `None`, which callers
    /// treat the same as "not canonical".
    async fn inspect(&self, audio: &[u8]) -> Option<AudioMetadata>;

    /// Transcodes to mono 48 kHz Opus in Ogg at 64 kbps, tuned for voice.
    ///
    /// # Errors
    ///
    /// `RecodeFailed` if the tool fails or produces no output.
    async fn recode(&self, audio: &[u8]) -> Result<Vec<u8>>;

    /// Container duration in fractional seconds.
    ///
    /// # Errors
    ///
    /// `DurationProbeFailed` if the tool fails or its output is not a
    /// non-negative number.
    async fn duration(&self, audio: &[u8]) -> Result<f64>;
}
