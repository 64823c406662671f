//! Generated audio artifact management.
//!
//! Utterances and audiobooks written into the outputs directory are named
//! `kokoro-<voice>-<uuid>.wav` so the voice can be recovered from the
//! filename alone.

use crate::error::{Result, SpeechError};
use serde::Serialize;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

/// One artifact in the outputs directory.
#[derive(Debug, Clone, Serialize)]
pub struct AudioArtifact {
    /// Filename stem, usable as an id.
    pub id: String,
    /// Full filename within the outputs directory.
    pub filename: String,
    /// Voice id parsed from the filename.
    pub voice: String,
    /// Duration in seconds, read from the WAV header.
    pub duration_secs: f64,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Fresh artifact filename for a voice.
#[must_use]
pub fn artifact_filename(voice: &str) -> String {
    format!("kokoro-{voice}-{}.wav", uuid::Uuid::new_v4())
}

/// List generated artifacts, newest first.
///
/// Files that are not `kokoro-*.wav` or whose header cannot be parsed are
/// skipped. A missing outputs directory yields an empty list.
///
/// # Errors
///
/// Returns an error if the directory cannot be enumerated.
pub fn list_audio(dir: &Path) -> Result<Vec<AudioArtifact>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<(SystemTime, AudioArtifact)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let filename = entry.file_name().to_string_lossy().into_owned();
        if !filename.starts_with("kokoro-") || !filename.ends_with(".wav") {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Some(duration_secs) = wav_duration(&entry.path()) else {
            debug!(filename, "skipping artifact with unreadable header");
            continue;
        };

        let stem = filename.trim_end_matches(".wav");
        let voice = stem
            .split('-')
            .nth(1)
            .unwrap_or("unknown")
            .to_owned();
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push((
            modified,
            AudioArtifact {
                id: stem.to_owned(),
                filename,
                voice,
                duration_secs,
                size_bytes: metadata.len(),
            },
        ));
    }

    entries.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(entries.into_iter().map(|(_, artifact)| artifact).collect())
}

/// Delete one artifact by filename.
///
/// # Errors
///
/// `InvalidArguments` for names that escape the outputs directory or do not
/// look like artifacts; `Io` when the file does not exist or cannot be
/// removed.
pub fn delete_audio(dir: &Path, filename: &str) -> Result<()> {
    if filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
        || !filename.ends_with(".wav")
    {
        return Err(SpeechError::InvalidArguments(format!(
            "invalid artifact filename: {filename}"
        )));
    }
    std::fs::remove_file(dir.join(filename))?;
    Ok(())
}

fn wav_duration(path: &Path) -> Option<f64> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}
