//! Error types for the speech core.

use std::path::PathBuf;

/// Top-level error type for the speech core.
///
/// Every variant carries a stable wire code (see [`SpeechError::code`]) and a
/// human-readable message; host boundaries surface both and never an
/// unstructured failure.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// The model weights file is missing from the resource directory.
    /// Retryable once the model has been provisioned.
    #[error("model not found; expected resources under {dir}")]
    ModelNotFound {
        /// Directory the loader searched.
        dir: PathBuf,
    },

    /// A load is already in progress; the caller should retry later.
    #[error("model load already in progress")]
    AlreadyLoading,

    /// Synthesis was requested before a successful load.
    #[error("model not loaded; call load_model first")]
    NotLoaded,

    /// Neither the requested voice nor the default voice has an embedding.
    #[error("no embedding available for voice {voice:?} or the default voice")]
    VoiceUnavailable {
        /// Voice id the caller asked for.
        voice: String,
    },

    /// A synthesis invocation failed. Recoverable inside the audiobook
    /// pipeline; job-fatal for single utterances.
    #[error("synthesis failed: {0}")]
    Generation(String),

    /// An audiobook job produced no audio across all of its chunks.
    #[error("no chunk produced any audio")]
    EmptyOutput,

    /// Persisting the final audio artifact failed.
    #[error("failed to write audio artifact: {0}")]
    Write(String),

    /// A malformed request at the host boundary (missing or mistyped field).
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The document reader could not parse the supplied bytes.
    #[error("document read error: {0}")]
    DocumentRead(String),

    /// Audio output device error.
    #[error("audio output error: {0}")]
    Audio(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Channel send/receive error (runtime gone or request dropped).
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpeechError {
    /// Stable wire code for the host boundary.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::AlreadyLoading => "ALREADY_LOADING",
            Self::NotLoaded => "NOT_LOADED",
            Self::VoiceUnavailable { .. } => "VOICE_UNAVAILABLE",
            Self::Generation(_) => "GENERATION_ERROR",
            Self::EmptyOutput => "EMPTY_OUTPUT",
            Self::Write(_) => "WRITE_ERROR",
            Self::InvalidArguments(_) => "INVALID_ARGUMENTS",
            Self::DocumentRead(_) => "DOCUMENT_READ_ERROR",
            Self::Audio(_) => "AUDIO_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Channel(_) => "CHANNEL_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SpeechError>;
