//! Synthesis engine lifecycle and voice-embedding management.

pub mod state;

use crate::error::Result;
use std::collections::HashMap;
use std::path::Path;

pub use state::{EngineState, EngineStateManager, LoadBegin};

/// Engine output sample rate in Hz (Kokoro always outputs 24 kHz).
pub const SAMPLE_RATE: u32 = 24_000;

/// Model weights filename inside the model directory.
pub const MODEL_FILE: &str = "kokoro-v1_0.safetensors";

/// Voice embedding store filename inside the model directory.
pub const STORE_FILE: &str = "voices.npz";

/// Opaque voice style vector consumed by the synthesis engine.
pub type Embedding = Vec<f32>;

/// Embedding-store key for a catalog voice id. Store entries carry a `.npy`
/// suffix on their keys.
#[must_use]
pub fn store_key(voice_id: &str) -> String {
    format!("{voice_id}.npy")
}

/// A loaded synthesis engine.
///
/// Given a voice embedding, a language tag, text and a speed factor,
/// produces f32 mono samples at [`SAMPLE_RATE`]. May fail per invocation;
/// the audiobook pipeline treats such failures as recoverable.
pub trait Synthesizer: Send {
    /// Synthesize one utterance.
    ///
    /// # Errors
    ///
    /// Returns an error when this invocation fails; the engine remains
    /// usable for further calls.
    fn synthesize(
        &mut self,
        embedding: &[f32],
        language: &str,
        text: &str,
        speed: f32,
    ) -> Result<Vec<f32>>;
}

/// Factory that loads a [`Synthesizer`] from a model weights file.
///
/// The neural model itself is an external collaborator; the core only
/// depends on this seam.
pub trait SynthesisBackend: Send + Sync {
    /// Load the engine from the given weights file.
    ///
    /// # Errors
    ///
    /// Returns an error if the weights cannot be loaded.
    fn load(&self, model_path: &Path) -> Result<Box<dyn Synthesizer>>;
}

/// Loader for the voice embedding store.
///
/// Given the store file, returns a map from store key (see [`store_key`]) to
/// embedding vector. The store's binary layout is the loader's concern.
pub trait EmbeddingStoreLoader: Send + Sync {
    /// Read the store file into a key → embedding map.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    fn load(&self, store_path: &Path) -> Result<HashMap<String, Embedding>>;
}
