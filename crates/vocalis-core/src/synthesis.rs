//! Remote speech synthesis interface.

use crate::error::Result;
use async_trait::async_trait;

/// Generates speech for `text` in the voice of `reference_audio`.
///
/// One synchronous attempt per call; implementations bound the call with a
/// timeout and never retry. Dropping the returned future abandons the
/// request.
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    /// # Errors
    ///
    /// `Synthesis` on transport failure, timeout, or an in-band error status.
    async fn synthesize(&self, text: &str, reference_audio: Vec<u8>) -> Result<Vec<u8>>;
}
