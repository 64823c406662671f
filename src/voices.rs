//! Static voice catalog.
//!
//! The catalog is a process-wide read-only table; exactly one entry is the
//! default voice, used as the fallback whenever a requested voice has no
//! embedding.

use serde::Serialize;

/// Language tag used when a voice id is unrecognized.
pub const BASELINE_LANGUAGE: &str = "en-GB";

/// One voice in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceDescriptor {
    /// Stable string key, also the embedding-store lookup base.
    #[serde(rename = "code")]
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Gender tag.
    pub gender: &'static str,
    /// Quality grade.
    pub grade: &'static str,
    /// BCP-47 language tag.
    pub language: &'static str,
    /// Language display name.
    pub language_name: &'static str,
    /// Whether this voice is the catalog default.
    pub is_default: bool,
}

/// The British Kokoro voices.
const VOICES: &[VoiceDescriptor] = &[
    voice("bf_emma", "Emma", "female", "B-", true),
    voice("bf_isabella", "Isabella", "female", "C", false),
    voice("bf_alice", "Alice", "female", "D", false),
    voice("bf_lily", "Lily", "female", "D", false),
    voice("bm_george", "George", "male", "C", false),
    voice("bm_fable", "Fable", "male", "C", false),
    voice("bm_lewis", "Lewis", "male", "D+", false),
    voice("bm_daniel", "Daniel", "male", "D", false),
];

const fn voice(
    id: &'static str,
    name: &'static str,
    gender: &'static str,
    grade: &'static str,
    is_default: bool,
) -> VoiceDescriptor {
    VoiceDescriptor {
        id,
        name,
        gender,
        grade,
        language: "en-GB",
        language_name: "English (UK)",
        is_default,
    }
}

/// The full catalog, in presentation order.
#[must_use]
pub fn catalog() -> &'static [VoiceDescriptor] {
    VOICES
}

/// The catalog's single default voice.
#[must_use]
pub fn default_voice() -> &'static VoiceDescriptor {
    // The catalog is static; exactly one entry is marked default.
    VOICES
        .iter()
        .find(|v| v.is_default)
        .unwrap_or(&VOICES[0])
}

/// Look up a voice by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static VoiceDescriptor> {
    VOICES.iter().find(|v| v.id == id)
}

/// Catalog language tag for `id`, or [`BASELINE_LANGUAGE`] when unknown.
#[must_use]
pub fn language_for(id: &str) -> &'static str {
    find(id).map_or(BASELINE_LANGUAGE, |v| v.language)
}
