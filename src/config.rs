//! Configuration for the speech core.

use crate::error::{Result, SpeechError};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Synthesis settings.
    pub tts: TtsConfig,
    /// Audiobook pipeline settings.
    pub audiobook: AudiobookConfig,
}

/// Synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Default voice id (catalog key, e.g. "bf_emma").
    pub voice: String,
    /// Speech speed multiplier (0.5–2.0).
    pub speed: f32,
    /// Engine output sample rate in Hz (Kokoro always outputs 24 kHz).
    pub sample_rate: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: "bf_emma".to_owned(),
            speed: 1.0,
            sample_rate: 24_000,
        }
    }
}

/// Audiobook pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudiobookConfig {
    /// Silence inserted between chunk positions, in seconds.
    pub gap_secs: f32,
    /// Maximum characters per synthesis call; longer utterances are split at
    /// sentence boundaries.
    pub max_chunk_chars: usize,
}

impl Default for AudiobookConfig {
    fn default() -> Self {
        Self {
            gap_secs: 0.5,
            max_chunk_chars: 1_500,
        }
    }
}

impl SpeechConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| SpeechError::Config(e.to_string()))?;
        Ok(config.clamped())
    }

    /// Load from the given path, or defaults when the file does not exist.
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(SpeechError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "config unreadable; using defaults");
                Self::default()
            }
        }
    }

    /// Save configuration to a TOML file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SpeechError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Bring out-of-range values back into their valid ranges.
    fn clamped(mut self) -> Self {
        self.tts.speed = self.tts.speed.clamp(0.5, 2.0);
        if self.tts.sample_rate == 0 {
            self.tts.sample_rate = TtsConfig::default().sample_rate;
        }
        if self.audiobook.gap_secs < 0.0 {
            self.audiobook.gap_secs = 0.0;
        }
        if self.audiobook.max_chunk_chars == 0 {
            self.audiobook.max_chunk_chars = AudiobookConfig::default().max_chunk_chars;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SpeechConfig::default();
        assert_eq!(config.tts.voice, "bf_emma");
        assert!(config.tts.speed > 0.0);
        assert_eq!(config.tts.sample_rate, 24_000);
        assert!(config.audiobook.gap_secs > 0.0);
        assert!(config.audiobook.max_chunk_chars > 0);
    }

    #[test]
    fn partial_file_fills_missing_fields_with_defaults() {
        let parsed: SpeechConfig = toml::from_str("[tts]\nvoice = \"bm_george\"\n")
            .expect("parse partial config in test");
        assert_eq!(parsed.tts.voice, "bm_george");
        assert_eq!(parsed.tts.sample_rate, 24_000);
        assert!((parsed.audiobook.gap_secs - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn out_of_range_speed_is_clamped_on_load() {
        let dir = tempfile::tempdir().expect("tempdir in test");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tts]\nspeed = 9.0\n").expect("write config in test");
        let config = SpeechConfig::from_file(&path).expect("load config in test");
        assert!((config.tts.speed - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir in test");
        let config = SpeechConfig::load_or_default(&dir.path().join("nope.toml"));
        assert_eq!(config.tts.voice, "bf_emma");
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir in test");
        let path = dir.path().join("nested").join("config.toml");
        let mut config = SpeechConfig::default();
        config.tts.voice = "bf_alice".to_owned();
        config.save_to_file(&path).expect("save config in test");
        let reloaded = SpeechConfig::from_file(&path).expect("reload config in test");
        assert_eq!(reloaded.tts.voice, "bf_alice");
    }
}
