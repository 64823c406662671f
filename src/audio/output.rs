//! Audio output device seam.
//!
//! The device itself (platform player, buffering) belongs to the embedding
//! application; the core drives it through this trait. All calls are made
//! from the speech runtime task, so implementations see transport controls
//! serialized with synthesis jobs.

use crate::error::Result;

/// Playback device for encoded WAV bytes.
pub trait AudioOutput: Send {
    /// Start playing the given WAV bytes, replacing any current playback.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the audio.
    fn play(&mut self, wav_bytes: &[u8]) -> Result<()>;

    /// Pause the current playback, if any.
    fn pause(&mut self);

    /// Resume a paused playback, if any.
    fn resume(&mut self);

    /// Stop and discard the current playback, if any.
    fn stop(&mut self);

    /// Whether audio is currently playing.
    fn is_playing(&self) -> bool;
}

/// Output that discards all audio. Used when the embedder provides no
/// device (headless generation).
#[derive(Debug, Default)]
pub struct NoopAudioOutput;

impl AudioOutput for NoopAudioOutput {
    fn play(&mut self, _wav_bytes: &[u8]) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn stop(&mut self) {}

    fn is_playing(&self) -> bool {
        false
    }
}
