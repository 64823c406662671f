//! The speech runtime: a single background task owning all mutable state.
//!
//! All loading, synthesis, encoding and extraction work runs on this task,
//! decoupled from the caller's control thread. The task is the sole mutator
//! of the engine state and the embedding table, and the sole owner of the
//! playback handle, so jobs and transport controls are serialized by
//! construction (one job in flight at a time) rather than by locking.
//!
//! Commands arrive on a bounded mpsc channel carrying oneshot responders;
//! progress events leave on a broadcast channel and are dropped when nobody
//! is subscribed, never buffered indefinitely. Model loading runs on the
//! blocking pool with a completion message back into the task, which keeps
//! the command loop responsive while a load is in flight — a concurrent
//! second load observes `Loading` and fails fast with `AlreadyLoading`.

use crate::artifacts::{self, AudioArtifact};
use crate::audio::output::AudioOutput;
use crate::audio::wav::encode_wav;
use crate::audiobook::{self, AudiobookJob, AudiobookResult, ProgressEvent};
use crate::config::SpeechConfig;
use crate::document::{self, DocumentReader};
use crate::engine::{
    Embedding, EmbeddingStoreLoader, EngineStateManager, LoadBegin, SAMPLE_RATE, SynthesisBackend,
    Synthesizer,
};
use crate::error::{Result, SpeechError};
use crate::mayari_dirs;
use crate::text::chunking::smart_chunk_text;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{info, warn};

/// Command channel capacity.
const COMMAND_CAPACITY: usize = 64;

/// Progress broadcast capacity.
const PROGRESS_CAPACITY: usize = 128;

/// External collaborators injected at spawn time.
pub struct Collaborators {
    /// Loads the synthesis engine from the model weights file.
    pub backend: Arc<dyn SynthesisBackend>,
    /// Reads the voice embedding store.
    pub embeddings: Arc<dyn EmbeddingStoreLoader>,
    /// Playback device for spoken utterances.
    pub output: Box<dyn AudioOutput>,
    /// Document page-text reader.
    pub documents: Arc<dyn DocumentReader>,
}

/// Filesystem and tuning options for the runtime.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Tuning configuration.
    pub config: SpeechConfig,
    /// Directory holding the model weights and embedding store.
    pub model_dir: PathBuf,
    /// Directory generated artifacts are written into.
    pub outputs_dir: PathBuf,
}

impl RuntimeOptions {
    /// Options using the standard application directories.
    #[must_use]
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            model_dir: mayari_dirs::model_dir(),
            outputs_dir: mayari_dirs::outputs_dir(),
        }
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self::new(SpeechConfig::default())
    }
}

/// Engine lifecycle snapshot for the host surface.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelStatus {
    /// Whether a load has completed.
    pub loaded: bool,
    /// Whether a load is in flight.
    pub loading: bool,
    /// Whether the engine is linked into this build at all.
    pub available: bool,
}

/// One single-utterance request.
#[derive(Debug, Clone)]
pub struct SpeakRequest {
    /// Text to synthesize.
    pub text: String,
    /// Voice id; `None` uses the configured default.
    pub voice: Option<String>,
    /// Speed factor; `None` uses the configured default.
    pub speed: Option<f32>,
}

/// Result of a spoken utterance.
#[derive(Debug, Clone, Serialize)]
pub struct SpeakOutcome {
    /// Artifact filename within the outputs directory.
    pub filename: String,
    /// Full artifact path.
    pub path: PathBuf,
    /// Voice that was used after defaulting.
    pub voice: String,
    /// Duration in seconds.
    pub duration_secs: f64,
}

/// Everything the blocking load produces.
struct LoadedAssets {
    synthesizer: Box<dyn Synthesizer>,
    store: HashMap<String, Embedding>,
}

enum Command {
    LoadModel {
        reply: oneshot::Sender<Result<bool>>,
    },
    LoadFinished {
        outcome: Result<LoadedAssets>,
        reply: oneshot::Sender<Result<bool>>,
    },
    ModelStatus {
        reply: oneshot::Sender<ModelStatus>,
    },
    Speak {
        request: SpeakRequest,
        reply: oneshot::Sender<Result<SpeakOutcome>>,
    },
    Pause {
        reply: oneshot::Sender<()>,
    },
    Resume {
        reply: oneshot::Sender<()>,
    },
    StopPlayback {
        reply: oneshot::Sender<()>,
    },
    IsPlaying {
        reply: oneshot::Sender<bool>,
    },
    GenerateAudiobook {
        job: AudiobookJob,
        reply: oneshot::Sender<Result<AudiobookResult>>,
    },
    ExtractText {
        bytes: Vec<u8>,
        start_page: usize,
        reply: oneshot::Sender<Result<String>>,
    },
    ListAudio {
        reply: oneshot::Sender<Result<Vec<AudioArtifact>>>,
    },
    DeleteAudio {
        filename: String,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Clonable client for the speech runtime task.
#[derive(Clone)]
pub struct SpeechHandle {
    commands: mpsc::Sender<Command>,
    progress: broadcast::Sender<ProgressEvent>,
}

impl SpeechHandle {
    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(make(reply_tx))
            .await
            .map_err(|_| SpeechError::Channel("speech runtime has shut down".into()))?;
        reply_rx
            .await
            .map_err(|_| SpeechError::Channel("speech runtime dropped the request".into()))
    }

    /// Whether the runtime task is alive.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.commands.is_closed()
    }

    /// Load the model and populate voice embeddings.
    ///
    /// Returns `Ok(true)` once loaded; a repeat call after a completed load
    /// succeeds without re-reading any resource.
    ///
    /// # Errors
    ///
    /// `ModelNotFound` when the weights are absent (retryable),
    /// `AlreadyLoading` when a load is in flight.
    pub async fn load_model(&self) -> Result<bool> {
        self.call(|reply| Command::LoadModel { reply }).await?
    }

    /// Engine lifecycle snapshot.
    ///
    /// # Errors
    ///
    /// Channel errors only.
    pub async fn model_status(&self) -> Result<ModelStatus> {
        self.call(|reply| Command::ModelStatus { reply }).await
    }

    /// Synthesize one utterance, persist it and play it.
    ///
    /// # Errors
    ///
    /// `NotLoaded`, `VoiceUnavailable`, `Generation`, `Write`, or the
    /// device's playback error.
    pub async fn speak(&self, request: SpeakRequest) -> Result<SpeakOutcome> {
        self.call(|reply| Command::Speak { request, reply }).await?
    }

    /// Pause playback.
    ///
    /// # Errors
    ///
    /// Channel errors only.
    pub async fn pause(&self) -> Result<()> {
        self.call(|reply| Command::Pause { reply }).await
    }

    /// Resume paused playback.
    ///
    /// # Errors
    ///
    /// Channel errors only.
    pub async fn resume(&self) -> Result<()> {
        self.call(|reply| Command::Resume { reply }).await
    }

    /// Stop and discard playback.
    ///
    /// # Errors
    ///
    /// Channel errors only.
    pub async fn stop(&self) -> Result<()> {
        self.call(|reply| Command::StopPlayback { reply }).await
    }

    /// Whether audio is currently playing.
    ///
    /// # Errors
    ///
    /// Channel errors only.
    pub async fn is_playing(&self) -> Result<bool> {
        self.call(|reply| Command::IsPlaying { reply }).await
    }

    /// Run an audiobook job to completion.
    ///
    /// Progress events stream on [`Self::subscribe_progress`] while the job
    /// runs; the result resolves only after every chunk has been attempted.
    ///
    /// # Errors
    ///
    /// See [`audiobook::generate`].
    pub async fn generate_audiobook(&self, job: AudiobookJob) -> Result<AudiobookResult> {
        self.call(|reply| Command::GenerateAudiobook { job, reply })
            .await?
    }

    /// Extract and normalize document text.
    ///
    /// # Errors
    ///
    /// `DocumentRead` when the bytes cannot be parsed.
    pub async fn extract_text(&self, bytes: Vec<u8>, start_page: usize) -> Result<String> {
        self.call(|reply| Command::ExtractText {
            bytes,
            start_page,
            reply,
        })
        .await?
    }

    /// List generated artifacts, newest first.
    ///
    /// # Errors
    ///
    /// I/O errors from the outputs directory.
    pub async fn list_audio(&self) -> Result<Vec<AudioArtifact>> {
        self.call(|reply| Command::ListAudio { reply }).await?
    }

    /// Delete one generated artifact by filename.
    ///
    /// # Errors
    ///
    /// `InvalidArguments` for names outside the outputs directory, `Io` when
    /// the file is missing.
    pub async fn delete_audio(&self, filename: String) -> Result<()> {
        self.call(|reply| Command::DeleteAudio { filename, reply })
            .await?
    }

    /// Subscribe to audiobook progress events.
    ///
    /// Events are delivered in chunk order per job. A subscriber that lags
    /// behind the channel capacity loses the oldest events.
    #[must_use]
    pub fn subscribe_progress(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress.subscribe()
    }
}

/// The background task state. Constructed and consumed by [`SpeechRuntime::spawn`].
pub struct SpeechRuntime {
    engine: EngineStateManager,
    options: RuntimeOptions,
    backend: Arc<dyn SynthesisBackend>,
    embeddings: Arc<dyn EmbeddingStoreLoader>,
    output: Box<dyn AudioOutput>,
    documents: Arc<dyn DocumentReader>,
    commands: mpsc::Receiver<Command>,
    self_tx: mpsc::WeakSender<Command>,
    progress: broadcast::Sender<ProgressEvent>,
}

impl SpeechRuntime {
    /// Spawn the runtime task and return its handle.
    ///
    /// The task exits when every handle has been dropped.
    #[must_use]
    pub fn spawn(options: RuntimeOptions, collaborators: Collaborators) -> SpeechHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (progress_tx, _) = broadcast::channel(PROGRESS_CAPACITY);

        let runtime = Self {
            engine: EngineStateManager::new(),
            options,
            backend: collaborators.backend,
            embeddings: collaborators.embeddings,
            output: collaborators.output,
            documents: collaborators.documents,
            commands: command_rx,
            self_tx: command_tx.downgrade(),
            progress: progress_tx.clone(),
        };
        tokio::spawn(runtime.run());

        SpeechHandle {
            commands: command_tx,
            progress: progress_tx,
        }
    }

    async fn run(mut self) {
        info!("speech runtime started");
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }
        info!("speech runtime stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::LoadModel { reply } => self.handle_load(reply),
            Command::LoadFinished { outcome, reply } => {
                let result = match outcome {
                    Ok(assets) => {
                        self.engine.complete_load(assets.synthesizer, assets.store);
                        Ok(true)
                    }
                    Err(e) => {
                        warn!(error = %e, "model load failed");
                        self.engine.fail_load();
                        Err(e)
                    }
                };
                let _ = reply.send(result);
            }
            Command::ModelStatus { reply } => {
                let _ = reply.send(ModelStatus {
                    loaded: self.engine.is_loaded(),
                    loading: self.engine.is_loading(),
                    available: true,
                });
            }
            Command::Speak { request, reply } => {
                let _ = reply.send(self.handle_speak(request));
            }
            Command::Pause { reply } => {
                self.output.pause();
                let _ = reply.send(());
            }
            Command::Resume { reply } => {
                self.output.resume();
                let _ = reply.send(());
            }
            Command::StopPlayback { reply } => {
                self.output.stop();
                let _ = reply.send(());
            }
            Command::IsPlaying { reply } => {
                let _ = reply.send(self.output.is_playing());
            }
            Command::GenerateAudiobook { mut job, reply } => {
                job.speed = job.speed.clamp(0.5, 2.0);
                let gap_secs = self.options.config.audiobook.gap_secs;
                let progress = self.progress.clone();
                let result = audiobook::generate(&mut self.engine, &job, gap_secs, &mut |event| {
                    // No subscriber means the event is dropped, by design.
                    let _ = progress.send(event);
                });
                let _ = reply.send(result);
            }
            Command::ExtractText {
                bytes,
                start_page,
                reply,
            } => {
                let _ = reply.send(document::extract_text(
                    self.documents.as_ref(),
                    &bytes,
                    start_page,
                ));
            }
            Command::ListAudio { reply } => {
                let _ = reply.send(artifacts::list_audio(&self.options.outputs_dir));
            }
            Command::DeleteAudio { filename, reply } => {
                let _ = reply.send(artifacts::delete_audio(&self.options.outputs_dir, &filename));
            }
        }
    }

    /// Begin a load. The expensive work runs on the blocking pool; the
    /// completion message re-enters the command loop, so `Loading` stays
    /// observable while the load is in flight.
    fn handle_load(&mut self, reply: oneshot::Sender<Result<bool>>) {
        match self.engine.begin_load(&self.options.model_dir) {
            Ok(LoadBegin::AlreadyLoaded) => {
                let _ = reply.send(Ok(true));
            }
            Ok(LoadBegin::Started {
                model_path,
                store_path,
            }) => {
                let backend = Arc::clone(&self.backend);
                let loader = Arc::clone(&self.embeddings);
                let Some(command_tx) = self.self_tx.upgrade() else {
                    return;
                };
                tokio::task::spawn_blocking(move || {
                    let outcome =
                        load_assets(backend.as_ref(), loader.as_ref(), &model_path, &store_path);
                    if command_tx
                        .blocking_send(Command::LoadFinished { outcome, reply })
                        .is_err()
                    {
                        warn!("speech runtime gone before load completion");
                    }
                });
            }
            Err(e) => {
                let _ = reply.send(Err(e));
            }
        }
    }

    fn handle_speak(&mut self, request: SpeakRequest) -> Result<SpeakOutcome> {
        if !self.engine.is_loaded() {
            return Err(SpeechError::NotLoaded);
        }

        let voice = request
            .voice
            .unwrap_or_else(|| self.options.config.tts.voice.clone());
        let speed = request
            .speed
            .unwrap_or(self.options.config.tts.speed)
            .clamp(0.5, 2.0);
        let embedding = self.engine.resolve_voice(&voice)?.to_vec();
        let language = self.engine.resolve_language(&voice);

        let max_chars = self.options.config.audiobook.max_chunk_chars;
        let pieces: Vec<String> = if request.text.chars().count() > max_chars {
            smart_chunk_text(&request.text, max_chars)
        } else {
            vec![request.text]
        };

        let mut samples: Vec<f32> = Vec::new();
        for piece in &pieces {
            samples.extend(self.engine.synthesize(&embedding, language, piece, speed)?);
        }
        if samples.is_empty() {
            return Err(SpeechError::EmptyOutput);
        }

        let wav = encode_wav(&samples, SAMPLE_RATE);
        std::fs::create_dir_all(&self.options.outputs_dir).map_err(|e| {
            SpeechError::Write(format!("{}: {e}", self.options.outputs_dir.display()))
        })?;
        let filename = artifacts::artifact_filename(&voice);
        let path = self.options.outputs_dir.join(&filename);
        std::fs::write(&path, &wav).map_err(|e| SpeechError::Write(format!("{}: {e}", path.display())))?;
        self.output.play(&wav)?;

        let duration_secs = samples.len() as f64 / f64::from(SAMPLE_RATE);
        info!(voice = %voice, duration_secs, path = %path.display(), "utterance spoken");
        Ok(SpeakOutcome {
            filename,
            path,
            voice,
            duration_secs,
        })
    }
}

/// The blocking half of a load: read model weights and the embedding store.
///
/// Only a missing or unloadable model is fatal; a missing or unreadable
/// embedding store leaves every voice unpopulated and the load still
/// succeeds (synthesis then fails per-voice with `VoiceUnavailable`).
fn load_assets(
    backend: &dyn SynthesisBackend,
    loader: &dyn EmbeddingStoreLoader,
    model_path: &Path,
    store_path: &Path,
) -> Result<LoadedAssets> {
    info!(model = %model_path.display(), "loading model weights");
    let synthesizer = backend.load(model_path)?;

    let store = if store_path.exists() {
        match loader.load(store_path) {
            Ok(store) => store,
            Err(e) => {
                warn!(
                    error = %e,
                    store = %store_path.display(),
                    "embedding store unreadable; no voices populated"
                );
                HashMap::new()
            }
        }
    } else {
        warn!(store = %store_path.display(), "no embedding store found");
        HashMap::new()
    };

    Ok(LoadedAssets { synthesizer, store })
}
