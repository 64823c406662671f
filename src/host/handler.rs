//! Typed command dispatch for the host surface.
//!
//! Every command payload is decoded into an explicit request struct and
//! validated before it reaches the speech runtime; a missing or mistyped
//! field becomes a structured `INVALID_ARGUMENTS` response rather than a
//! crash. Responses carry either a success payload or a stable error code
//! plus message, never an unstructured failure.

use crate::audiobook::AudiobookJob;
use crate::error::{Result, SpeechError};
use crate::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};
use crate::runtime::{SpeakRequest, SpeechHandle};
use crate::voices;
use base64::Engine as _;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::PathBuf;

/// Maximum characters accepted by `tts.speak`.
const MAX_SPEAK_CHARS: usize = 10_000;

/// Wire payload for `tts.speak`.
#[derive(Debug, Deserialize)]
pub struct SpeakPayload {
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub speed: Option<f32>,
}

/// Wire payload for `tts.generate_audiobook`.
#[derive(Debug, Deserialize)]
pub struct GenerateAudiobookPayload {
    pub chunks: Vec<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub title: Option<String>,
    pub output_path: PathBuf,
    pub correlation_id: String,
}

/// Wire payload for `tts.extract_text`. Document bytes travel base64-encoded.
#[derive(Debug, Deserialize)]
pub struct ExtractTextPayload {
    pub data: String,
    #[serde(default)]
    pub start_page: Option<u32>,
}

/// Wire payload for `tts.delete_audio`.
#[derive(Debug, Deserialize)]
pub struct DeleteAudioPayload {
    pub filename: String,
}

/// Routes validated commands into the speech runtime.
#[derive(Clone)]
pub struct HostCommandHandler {
    speech: SpeechHandle,
}

impl HostCommandHandler {
    #[must_use]
    pub fn new(speech: SpeechHandle) -> Self {
        Self { speech }
    }

    /// The underlying runtime handle (for progress subscriptions).
    #[must_use]
    pub fn speech(&self) -> &SpeechHandle {
        &self.speech
    }

    /// Dispatch one command envelope to a response envelope.
    pub async fn dispatch(&self, envelope: CommandEnvelope) -> ResponseEnvelope {
        if let Err(e) = envelope.validate() {
            return ResponseEnvelope::error(
                envelope.request_id.clone(),
                "INVALID_ARGUMENTS",
                e.to_string(),
            );
        }
        let request_id = envelope.request_id.clone();
        match self.execute(envelope).await {
            Ok(payload) => ResponseEnvelope::ok(request_id, payload),
            Err(e) => ResponseEnvelope::error(request_id, e.code(), e.to_string()),
        }
    }

    async fn execute(&self, envelope: CommandEnvelope) -> Result<serde_json::Value> {
        match envelope.command {
            CommandName::IsAvailable => Ok(json!({ "available": self.speech.is_available() })),
            CommandName::LoadModel => {
                let loaded = self.speech.load_model().await?;
                Ok(json!({ "loaded": loaded }))
            }
            CommandName::GetVoices => Ok(json!({
                "voices": voices::catalog(),
                "default": voices::default_voice().id,
            })),
            CommandName::Speak => {
                let payload: SpeakPayload = decode(envelope.payload)?;
                let request = validate_speak(payload)?;
                let outcome = self.speech.speak(request).await?;
                Ok(json!({
                    "filename": outcome.filename,
                    "voice": outcome.voice,
                    "duration_secs": outcome.duration_secs,
                }))
            }
            CommandName::Pause => {
                self.speech.pause().await?;
                Ok(json!({ "paused": true }))
            }
            CommandName::Resume => {
                self.speech.resume().await?;
                Ok(json!({ "resumed": true }))
            }
            CommandName::Stop => {
                self.speech.stop().await?;
                Ok(json!({ "stopped": true }))
            }
            CommandName::IsPlaying => {
                Ok(json!({ "playing": self.speech.is_playing().await? }))
            }
            CommandName::ModelStatus => {
                let status = self.speech.model_status().await?;
                Ok(json!({
                    "loaded": status.loaded,
                    "loading": status.loading,
                    "available": status.available,
                }))
            }
            CommandName::GenerateAudiobook => {
                let payload: GenerateAudiobookPayload = decode(envelope.payload)?;
                let job = validate_audiobook(payload)?;
                let result = self.speech.generate_audiobook(job).await?;
                Ok(json!({
                    "path": result.path,
                    "duration": result.duration_secs,
                    "chunk_count": result.chunk_count,
                    "format": result.format,
                }))
            }
            CommandName::ExtractText => {
                let payload: ExtractTextPayload = decode(envelope.payload)?;
                let (bytes, start_page) = validate_extract(payload)?;
                let text = self.speech.extract_text(bytes, start_page).await?;
                Ok(json!({ "text": text }))
            }
            CommandName::ListAudio => {
                let files = self.speech.list_audio().await?;
                Ok(json!({ "audio_files": files }))
            }
            CommandName::DeleteAudio => {
                let payload: DeleteAudioPayload = decode(envelope.payload)?;
                let filename = payload.filename.trim().to_owned();
                if filename.is_empty() {
                    return Err(SpeechError::InvalidArguments(
                        "filename is required".to_owned(),
                    ));
                }
                self.speech.delete_audio(filename.clone()).await?;
                Ok(json!({ "deleted": filename }))
            }
        }
    }
}

fn decode<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| SpeechError::InvalidArguments(e.to_string()))
}

fn validate_speak(payload: SpeakPayload) -> Result<SpeakRequest> {
    if payload.text.trim().is_empty() {
        return Err(SpeechError::InvalidArguments("text is required".to_owned()));
    }
    if payload.text.chars().count() > MAX_SPEAK_CHARS {
        return Err(SpeechError::InvalidArguments(format!(
            "text too long (max {MAX_SPEAK_CHARS} chars)"
        )));
    }
    if let Some(speed) = payload.speed
        && !speed.is_finite()
    {
        return Err(SpeechError::InvalidArguments(
            "speed must be a finite number".to_owned(),
        ));
    }
    Ok(SpeakRequest {
        text: payload.text,
        voice: payload.voice,
        speed: payload.speed,
    })
}

fn validate_audiobook(payload: GenerateAudiobookPayload) -> Result<AudiobookJob> {
    if payload.chunks.is_empty() {
        return Err(SpeechError::InvalidArguments(
            "chunks must not be empty".to_owned(),
        ));
    }
    if payload.correlation_id.trim().is_empty() {
        return Err(SpeechError::InvalidArguments(
            "correlation_id is required".to_owned(),
        ));
    }
    if payload.output_path.as_os_str().is_empty() {
        return Err(SpeechError::InvalidArguments(
            "output_path is required".to_owned(),
        ));
    }
    if let Some(speed) = payload.speed
        && !speed.is_finite()
    {
        return Err(SpeechError::InvalidArguments(
            "speed must be a finite number".to_owned(),
        ));
    }
    Ok(AudiobookJob {
        chunks: payload.chunks,
        voice: payload
            .voice
            .unwrap_or_else(|| voices::default_voice().id.to_owned()),
        speed: payload.speed.unwrap_or(1.0),
        title: payload.title.unwrap_or_default(),
        output_path: payload.output_path,
        correlation_id: payload.correlation_id,
    })
}

fn validate_extract(payload: ExtractTextPayload) -> Result<(Vec<u8>, usize)> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.data.as_bytes())
        .map_err(|e| SpeechError::InvalidArguments(format!("data is not valid base64: {e}")))?;
    let start_page = payload.start_page.unwrap_or(1);
    if start_page == 0 {
        return Err(SpeechError::InvalidArguments(
            "start_page is 1-based".to_owned(),
        ));
    }
    Ok((bytes, start_page as usize))
}
