//! Audio normalization.
//!
//! Every voice reply must be a mono 48 kHz Opus clip in an Ogg container with
//! a known duration. `AudioNormalizer` enforces that on top of an
//! `AudioToolkit` (probe, recode, measure).

mod metadata;
mod normalizer;
mod toolkit;

pub use metadata::{AudioMetadata, CANONICAL_CHANNELS, CANONICAL_CODEC, CANONICAL_SAMPLE_RATE};
pub use normalizer::{AudioNormalizer, NormalizedClip};
pub use toolkit::AudioToolkit;
