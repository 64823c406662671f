//! Engine lifecycle state machine and the voice → embedding table.
//!
//! The manager is owned exclusively by the speech runtime task; nothing else
//! mutates [`EngineState`] or the embedding table. Transitions are
//! `Unloaded → Loading`, `Loading → Loaded`, and `Loading → Unloaded` on
//! failure; `Loaded` is sticky.

use super::{Embedding, MODEL_FILE, STORE_FILE, Synthesizer, store_key};
use crate::error::{Result, SpeechError};
use crate::voices;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No model resources held.
    #[default]
    Unloaded,
    /// A load is in flight on the blocking pool.
    Loading,
    /// Model and embeddings are resident.
    Loaded,
}

/// Outcome of [`EngineStateManager::begin_load`].
#[derive(Debug)]
pub enum LoadBegin {
    /// Already loaded; nothing to do and no resource is re-read.
    AlreadyLoaded,
    /// Transitioned to `Loading`; the caller must run the load and then call
    /// [`EngineStateManager::complete_load`] or
    /// [`EngineStateManager::fail_load`].
    Started {
        /// Path of the model weights file (verified to exist).
        model_path: PathBuf,
        /// Path of the embedding store file (may be absent).
        store_path: PathBuf,
    },
}

/// Owns the lifecycle state, the loaded synthesizer, and the embedding table.
#[derive(Default)]
pub struct EngineStateManager {
    state: EngineState,
    embeddings: HashMap<String, Embedding>,
    synthesizer: Option<Box<dyn Synthesizer>>,
}

impl std::fmt::Debug for EngineStateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineStateManager")
            .field("state", &self.state)
            .field("embeddings", &self.embeddings.len())
            .finish()
    }
}

impl EngineStateManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state == EngineState::Loaded
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == EngineState::Loading
    }

    /// Start a load cycle.
    ///
    /// `Loaded` short-circuits to [`LoadBegin::AlreadyLoaded`]. A load
    /// already in flight fails fast with `AlreadyLoading` (no queueing). A
    /// missing model file fails with `ModelNotFound` carrying the expected
    /// directory, and the state returns to `Unloaded` so the caller can
    /// retry after provisioning.
    ///
    /// # Errors
    ///
    /// `AlreadyLoading` or `ModelNotFound` as above.
    pub fn begin_load(&mut self, model_dir: &Path) -> Result<LoadBegin> {
        match self.state {
            EngineState::Loaded => return Ok(LoadBegin::AlreadyLoaded),
            EngineState::Loading => return Err(SpeechError::AlreadyLoading),
            EngineState::Unloaded => {}
        }

        self.state = EngineState::Loading;
        let model_path = model_dir.join(MODEL_FILE);
        if !model_path.exists() {
            self.state = EngineState::Unloaded;
            return Err(SpeechError::ModelNotFound {
                dir: model_dir.to_path_buf(),
            });
        }

        Ok(LoadBegin::Started {
            model_path,
            store_path: model_dir.join(STORE_FILE),
        })
    }

    /// Finish a successful load: install the synthesizer and populate the
    /// embedding table from the store map.
    ///
    /// Every catalog voice id is looked up under its store key; voices
    /// absent from the store are left unpopulated. The table is immutable
    /// until the next load cycle.
    pub fn complete_load(
        &mut self,
        synthesizer: Box<dyn Synthesizer>,
        mut store: HashMap<String, Embedding>,
    ) {
        debug_assert_eq!(self.state, EngineState::Loading);
        self.embeddings.clear();
        for voice in voices::catalog() {
            if let Some(embedding) = store.remove(&store_key(voice.id)) {
                debug!(voice = voice.id, dims = embedding.len(), "loaded voice embedding");
                self.embeddings.insert(voice.id.to_owned(), embedding);
            }
        }
        self.synthesizer = Some(synthesizer);
        self.state = EngineState::Loaded;
        info!(voices = self.embeddings.len(), "engine loaded");
    }

    /// Abort a load: discard any partially populated table and return to
    /// `Unloaded`. A retry starts from a clean slate.
    pub fn fail_load(&mut self) {
        self.embeddings.clear();
        self.synthesizer = None;
        self.state = EngineState::Unloaded;
    }

    /// Resolve the embedding for `id`, falling back to the default voice.
    ///
    /// # Errors
    ///
    /// `VoiceUnavailable` when neither `id` nor the default voice has a
    /// populated embedding.
    pub fn resolve_voice(&self, id: &str) -> Result<&[f32]> {
        self.embeddings
            .get(id)
            .or_else(|| self.embeddings.get(voices::default_voice().id))
            .map(Vec::as_slice)
            .ok_or_else(|| SpeechError::VoiceUnavailable {
                voice: id.to_owned(),
            })
    }

    /// Catalog language tag for `id`, or the baseline language when `id` is
    /// unrecognized.
    #[must_use]
    pub fn resolve_language(&self, id: &str) -> &'static str {
        voices::language_for(id)
    }

    /// Run one synthesis call through the loaded engine.
    ///
    /// # Errors
    ///
    /// `NotLoaded` before a successful load; otherwise whatever the engine
    /// invocation returns.
    pub fn synthesize(
        &mut self,
        embedding: &[f32],
        language: &str,
        text: &str,
        speed: f32,
    ) -> Result<Vec<f32>> {
        let synthesizer = self.synthesizer.as_mut().ok_or(SpeechError::NotLoaded)?;
        synthesizer.synthesize(embedding, language, text, speed)
    }
}
