/// Codec of the canonical voice-note profile.
pub const CANONICAL_CODEC: &str = "opus";
/// Channel count of the canonical voice-note profile.
pub const CANONICAL_CHANNELS: u32 = 1;
/// Sample rate of the canonical voice-note profile, in Hz.
pub const CANONICAL_SAMPLE_RATE: u32 = 48_000;

/// First audio stream properties of a clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioMetadata {
    pub codec: String,
    pub channels: u32,
    pub sample_rate: u32,
}

impl AudioMetadata {
    pub fn new(codec: impl Into<String>, channels: u32, sample_rate: u32) -> Self {
        Self {
            codec: codec.into(),
            channels,
            sample_rate,
        }
    }

    /// Metadata of the canonical profile (mono 48 kHz Opus).
    pub fn canonical() -> Self {
        Self::new(CANONICAL_CODEC, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE)
    }

    /// Parses `ffprobe` stream output printed as `key=value` lines
    /// (`-of default=noprint_wrappers=1`). ffprobe orders the fields itself,
    /// so lines are matched by key.
    ///
    /// Returns `None` unless `codec_name`, `channels` and `sample_rate` each
    /// appear exactly once, are well-formed, and nothing else is present.
    pub fn parse_probe_output(output: &str) -> Option<Self> {
        let mut codec = None;
        let mut channels = None;
        let mut sample_rate = None;

        for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (key, value) = line.split_once('=')?;
            let slot = match key.trim() {
                "codec_name" => &mut codec,
                "channels" => &mut channels,
                "sample_rate" => &mut sample_rate,
                _ => return None,
            };
            if slot.replace(value.trim()).is_some() {
                return None;
            }
        }

        let codec = codec.filter(|c| !c.is_empty())?;
        Some(Self::new(
            codec,
            channels?.parse().ok()?,
            sample_rate?.parse().ok()?,
        ))
    }

    /// Whether the clip can be sent as a voice note without re-encoding.
    pub fn is_canonical(&self) -> bool {
        self.codec == CANONICAL_CODEC
            && self.channels == CANONICAL_CHANNELS
            && self.sample_rate == CANONICAL_SAMPLE_RATE
    }
}
