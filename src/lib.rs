//! Mayari speech core: text-to-speech for the Mayari reading app.
//!
//! Exposes the engine to a host application through a small command surface
//! and orchestrates three subsystems:
//! - **Engine lifecycle** ([`engine`]): the `Unloaded → Loading → Loaded`
//!   state machine and the voice → embedding table.
//! - **Audiobook synthesis** ([`audiobook`]): a chunked pipeline with
//!   partial-failure tolerance, ordered progress events, and silence
//!   spacing between chunks.
//! - **Audio and text plumbing** ([`audio`], [`text`]): deterministic WAV
//!   encoding and the normalization pipeline for extracted document text.
//!
//! # Architecture
//!
//! All mutable state lives on a single background task ([`runtime`]); host
//! surfaces talk to it through a [`SpeechHandle`] over channels. The neural
//! model, the embedding-store format, document parsing, and the playback
//! device are external collaborators behind traits ([`engine::SynthesisBackend`],
//! [`engine::EmbeddingStoreLoader`], [`document::DocumentReader`],
//! [`audio::AudioOutput`]).

pub mod artifacts;
pub mod audio;
pub mod audiobook;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod host;
pub mod mayari_dirs;
pub mod runtime;
pub mod text;
pub mod voices;

pub use audiobook::{AudiobookJob, AudiobookResult, ProgressEvent};
pub use config::SpeechConfig;
pub use error::{Result, SpeechError};
pub use runtime::{Collaborators, RuntimeOptions, SpeakRequest, SpeechHandle, SpeechRuntime};
pub use voices::VoiceDescriptor;
