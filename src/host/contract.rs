//! Versioned host command/event envelopes for native shell integration.

use serde::{Deserialize, Serialize};

/// Contract version for host command/event envelopes.
pub const EVENT_VERSION: u32 = 1;

/// Event name for audiobook progress notifications.
pub const PROGRESS_EVENT: &str = "tts.progress";

/// Command set for host integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "tts.is_available")]
    IsAvailable,
    #[serde(rename = "tts.load_model")]
    LoadModel,
    #[serde(rename = "tts.get_voices")]
    GetVoices,
    #[serde(rename = "tts.speak")]
    Speak,
    #[serde(rename = "tts.pause")]
    Pause,
    #[serde(rename = "tts.resume")]
    Resume,
    #[serde(rename = "tts.stop")]
    Stop,
    #[serde(rename = "tts.is_playing")]
    IsPlaying,
    #[serde(rename = "tts.model_status")]
    ModelStatus,
    #[serde(rename = "tts.generate_audiobook")]
    GenerateAudiobook,
    #[serde(rename = "tts.extract_text")]
    ExtractText,
    #[serde(rename = "tts.list_audio")]
    ListAudio,
    #[serde(rename = "tts.delete_audio")]
    DeleteAudio,
}

impl CommandName {
    /// Render command name to wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IsAvailable => "tts.is_available",
            Self::LoadModel => "tts.load_model",
            Self::GetVoices => "tts.get_voices",
            Self::Speak => "tts.speak",
            Self::Pause => "tts.pause",
            Self::Resume => "tts.resume",
            Self::Stop => "tts.stop",
            Self::IsPlaying => "tts.is_playing",
            Self::ModelStatus => "tts.model_status",
            Self::GenerateAudiobook => "tts.generate_audiobook",
            Self::ExtractText => "tts.extract_text",
            Self::ListAudio => "tts.list_audio",
            Self::DeleteAudio => "tts.delete_audio",
        }
    }

    /// Parse a command name from wire format.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tts.is_available" => Some(Self::IsAvailable),
            "tts.load_model" => Some(Self::LoadModel),
            "tts.get_voices" => Some(Self::GetVoices),
            "tts.speak" => Some(Self::Speak),
            "tts.pause" => Some(Self::Pause),
            "tts.resume" => Some(Self::Resume),
            "tts.stop" => Some(Self::Stop),
            "tts.is_playing" => Some(Self::IsPlaying),
            "tts.model_status" => Some(Self::ModelStatus),
            "tts.generate_audiobook" => Some(Self::GenerateAudiobook),
            "tts.extract_text" => Some(Self::ExtractText),
            "tts.list_audio" => Some(Self::ListAudio),
            "tts.delete_audio" => Some(Self::DeleteAudio),
            _ => None,
        }
    }
}

/// Structured error surfaced to the host: stable code plus message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// A versioned command envelope from frontend -> backend host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    /// Build a v1 command envelope.
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            command,
            payload,
        }
    }

    /// Validate envelope version and required identifiers.
    ///
    /// # Errors
    ///
    /// Returns a [`ContractError`] for an unsupported version or an empty
    /// request id.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != EVENT_VERSION {
            return Err(ContractError::new(
                ContractErrorKind::UnsupportedVersion,
                format!(
                    "unsupported contract version {}; expected {}",
                    self.v, EVENT_VERSION
                ),
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err(ContractError::new(
                ContractErrorKind::InvalidEnvelope,
                "request_id cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A versioned response envelope from backend host -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    pub payload: serde_json::Value,
    pub error: Option<ErrorBody>,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// A versioned event envelope from backend host -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub v: u32,
    pub event_id: String,
    pub event: String,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Build a v1 event envelope.
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        event: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            event_id: event_id.into(),
            event: event.into(),
            payload,
        }
    }
}

/// Contract validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    UnsupportedVersion,
    InvalidEnvelope,
}

/// Contract validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    #[must_use]
    pub fn new(kind: ContractErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ContractError {}
