use super::toolkit::AudioToolkit;
use crate::error::{Result, VocalisError};
use std::sync::Arc;
use tracing::debug;

/// A clip ready to be sent as a voice note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedClip {
    /// Opus-in-Ogg payload.
    pub bytes: Vec<u8>,
    /// Duration rounded to the nearest second.
    pub duration_seconds: u32,
}

/// Brings arbitrary audio onto the canonical voice-note profile.
///
/// Canonical input (mono 48 kHz Opus) is passed through byte-for-byte;
/// everything else, including input that cannot be inspected, is re-encoded.
#[derive(Clone)]
pub struct AudioNormalizer {
    toolkit: Arc<dyn AudioToolkit>,
}

impl AudioNormalizer {
    pub fn new(toolkit: Arc<dyn AudioToolkit>) -> Self {
        Self { toolkit }
    }

    /// Normalizes `raw` and measures the result.
    ///
    /// # Errors
    ///
    /// - `RecodeFailed` if re-encoding was needed and failed
    /// - `DurationProbeFailed` if the final payload cannot be measured
    pub async fn normalize(&self, raw: &[u8]) -> Result<NormalizedClip> {
        let metadata = self.toolkit.inspect(raw).await;

        let bytes = match &metadata {
            Some(meta) if meta.is_canonical() => {
                debug!(bytes = raw.len(), "Audio already canonical, skipping recode");
                raw.to_vec()
            }
            _ => {
                debug!(
                    bytes = raw.len(),
                    probed = ?metadata,
                    "Audio needs recode"
                );
                self.toolkit.recode(raw).await?
            }
        };

        let seconds = self.toolkit.duration(&bytes).await?;
        let duration_seconds = round_duration(seconds)?;

        Ok(NormalizedClip {
            bytes,
            duration_seconds,
        })
    }
}

/// Rounds half up: `floor(x + 0.5)`.
fn round_duration(seconds: f64) -> Result<u32> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(VocalisError::DurationProbeFailed(format!(
            "invalid duration {seconds}"
        )));
    }
    let rounded = (seconds + 0.5).floor();
    if rounded > f64::from(u32::MAX) {
        return Err(VocalisError::DurationProbeFailed(format!(
            "duration {seconds} out of range"
        )));
    }
    Ok(rounded as u32)
}
