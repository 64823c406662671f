//! Chunked audiobook synthesis pipeline.
//!
//! Processes a job's text chunks strictly in input order, tolerating
//! per-chunk synthesis failures: a failed chunk is recorded and the job
//! continues, failing only when no chunk produced audio at all. Progress is
//! reported before each chunk's synthesis call, in increasing index order.

use crate::audio::wav::encode_wav;
use crate::engine::{EngineStateManager, SAMPLE_RATE};
use crate::error::{Result, SpeechError};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// One audiobook request.
#[derive(Debug, Clone)]
pub struct AudiobookJob {
    /// Ordered text chunks. Order defines both progress indices and silence
    /// spacing.
    pub chunks: Vec<String>,
    /// Voice id; resolution falls back to the catalog default.
    pub voice: String,
    /// Speed factor.
    pub speed: f32,
    /// Title, for logging only.
    pub title: String,
    /// Where the encoded WAV is written.
    pub output_path: PathBuf,
    /// Caller-supplied id used to route progress events.
    pub correlation_id: String,
}

/// Progress notification emitted before each chunk's synthesis call.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// The job's correlation id.
    pub correlation_id: String,
    /// 1-based index over the original chunk sequence.
    pub current: usize,
    /// Total chunk count of the job.
    pub total: usize,
    /// Human-readable status line.
    pub status: String,
}

/// Successful job result.
#[derive(Debug, Clone, Serialize)]
pub struct AudiobookResult {
    /// Path the artifact was written to.
    pub path: PathBuf,
    /// Total duration in seconds, silence gaps included.
    pub duration_secs: f64,
    /// The original chunk count, not the count that produced audio.
    pub chunk_count: usize,
    /// Container format tag.
    pub format: &'static str,
}

/// Per-chunk outcome, aggregated for logging.
#[derive(Debug)]
enum ChunkOutcome {
    Synthesized { samples: usize },
    Skipped,
    Failed(String),
}

/// Run one audiobook job to completion.
///
/// Requires a loaded engine. The voice embedding and language are resolved
/// once for the whole job. After the final chunk, the accumulated buffer is
/// encoded and written to the job's output path.
///
/// # Errors
///
/// `NotLoaded` or `VoiceUnavailable` immediately; `EmptyOutput` when no
/// chunk produced audio; `Write` when persisting the artifact fails.
/// Per-chunk synthesis failures are absorbed and logged, never returned.
pub fn generate(
    engine: &mut EngineStateManager,
    job: &AudiobookJob,
    gap_secs: f32,
    progress: &mut dyn FnMut(ProgressEvent),
) -> Result<AudiobookResult> {
    if !engine.is_loaded() {
        return Err(SpeechError::NotLoaded);
    }

    // Resolved once per job, not per chunk.
    let embedding = engine.resolve_voice(&job.voice)?.to_vec();
    let language = engine.resolve_language(&job.voice);

    let total = job.chunks.len();
    let gap_samples = (gap_secs * SAMPLE_RATE as f32) as usize;
    info!(
        correlation_id = %job.correlation_id,
        title = %job.title,
        chunks = total,
        voice = %job.voice,
        "audiobook job started"
    );

    let mut buffer: Vec<f32> = Vec::new();
    let mut outcomes: Vec<ChunkOutcome> = Vec::with_capacity(total);

    for (index, raw_chunk) in job.chunks.iter().enumerate() {
        let text = raw_chunk.trim();
        if text.is_empty() {
            // Counts toward the total but triggers neither synthesis nor a
            // silence gap of its own.
            outcomes.push(ChunkOutcome::Skipped);
            continue;
        }

        progress(ProgressEvent {
            correlation_id: job.correlation_id.clone(),
            current: index + 1,
            total,
            status: format!("Generating chunk {} of {}", index + 1, total),
        });

        match engine.synthesize(&embedding, language, text, job.speed) {
            Ok(samples) => {
                buffer.extend_from_slice(&samples);
                // Gap insertion is driven by position in the original
                // sequence: every position except the last leaves one gap
                // after its audio, so a later failed or empty chunk keeps
                // the spacing it would have had.
                if index + 1 < total {
                    buffer.resize(buffer.len() + gap_samples, 0.0);
                }
                outcomes.push(ChunkOutcome::Synthesized {
                    samples: samples.len(),
                });
            }
            Err(e) => {
                warn!(
                    correlation_id = %job.correlation_id,
                    chunk = index + 1,
                    error = %e,
                    "chunk synthesis failed; continuing"
                );
                outcomes.push(ChunkOutcome::Failed(e.to_string()));
            }
        }
    }

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, ChunkOutcome::Failed(_)))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| matches!(o, ChunkOutcome::Skipped))
        .count();

    if buffer.is_empty() {
        warn!(
            correlation_id = %job.correlation_id,
            failed,
            skipped,
            "audiobook job produced no audio"
        );
        return Err(SpeechError::EmptyOutput);
    }

    let bytes = encode_wav(&buffer, SAMPLE_RATE);
    if let Some(parent) = job.output_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| SpeechError::Write(format!("{}: {e}", job.output_path.display())))?;
    }
    std::fs::write(&job.output_path, &bytes)
        .map_err(|e| SpeechError::Write(format!("{}: {e}", job.output_path.display())))?;

    let duration_secs = buffer.len() as f64 / f64::from(SAMPLE_RATE);
    info!(
        correlation_id = %job.correlation_id,
        path = %job.output_path.display(),
        duration_secs,
        failed,
        skipped,
        "audiobook job finished"
    );

    Ok(AudiobookResult {
        path: job.output_path.clone(),
        duration_secs,
        chunk_count: total,
        format: "wav",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LoadBegin, MODEL_FILE, Synthesizer, store_key};
    use std::collections::HashMap;

    /// Engine stub: fails on chunks containing "FAIL", otherwise emits one
    /// sample per input byte.
    struct ScriptedSynth;

    impl Synthesizer for ScriptedSynth {
        fn synthesize(
            &mut self,
            _embedding: &[f32],
            _language: &str,
            text: &str,
            _speed: f32,
        ) -> Result<Vec<f32>> {
            if text.contains("FAIL") {
                return Err(SpeechError::Generation("scripted failure".into()));
            }
            Ok(vec![0.5; text.len()])
        }
    }

    fn loaded_engine() -> (EngineStateManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir in test");
        std::fs::write(dir.path().join(MODEL_FILE), b"weights").expect("write model in test");
        let mut engine = EngineStateManager::new();
        let begin = engine.begin_load(dir.path()).expect("begin load in test");
        assert!(matches!(begin, LoadBegin::Started { .. }));
        let mut store = HashMap::new();
        store.insert(store_key("bf_emma"), vec![0.1_f32; 4]);
        engine.complete_load(Box::new(ScriptedSynth), store);
        (engine, dir)
    }

    fn job(chunks: &[&str], output: PathBuf) -> AudiobookJob {
        AudiobookJob {
            chunks: chunks.iter().map(|c| (*c).to_owned()).collect(),
            voice: "bf_emma".to_owned(),
            speed: 1.0,
            title: "Test Book".to_owned(),
            output_path: output,
            correlation_id: "job-1".to_owned(),
        }
    }

    fn run(
        engine: &mut EngineStateManager,
        job: &AudiobookJob,
    ) -> (Result<AudiobookResult>, Vec<ProgressEvent>) {
        let mut events = Vec::new();
        let result = generate(engine, job, 0.5, &mut |ev| events.push(ev));
        (result, events)
    }

    #[test]
    fn requires_loaded_engine() {
        let mut engine = EngineStateManager::new();
        let job = job(&["hello"], PathBuf::from("/tmp/never-written.wav"));
        let (result, events) = run(&mut engine, &job);
        assert!(matches!(result, Err(SpeechError::NotLoaded)));
        assert!(events.is_empty());
    }

    #[test]
    fn partial_failure_still_succeeds_with_one_gap() {
        let (mut engine, dir) = loaded_engine();
        let out = dir.path().join("book.wav");
        let job = job(&["aaaa", "FAIL", "bb"], out.clone());
        let (result, events) = run(&mut engine, &job);

        let result = result.expect("job should tolerate one failed chunk");
        assert_eq!(result.chunk_count, 3);
        assert!(result.duration_secs > 0.0);
        assert_eq!(result.format, "wav");

        // chunk 1 (4 samples) + one 0.5 s gap + chunk 3 (2 samples): the
        // failed middle chunk leaves the original spacing, not a double gap.
        let gap = (0.5 * SAMPLE_RATE as f32) as usize;
        let expected_samples = 4 + gap + 2;
        let bytes = std::fs::read(&out).expect("artifact in test");
        assert_eq!(bytes.len(), 44 + 2 * expected_samples);

        // All three non-empty chunks emitted progress, in order.
        let indices: Vec<usize> = events.iter().map(|e| e.current).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(events.iter().all(|e| e.total == 3));
        assert!(events.iter().all(|e| e.correlation_id == "job-1"));
    }

    #[test]
    fn total_failure_is_empty_output() {
        let (mut engine, dir) = loaded_engine();
        let out = dir.path().join("book.wav");
        let job = job(&["FAIL one", "FAIL two"], out.clone());
        let (result, _) = run(&mut engine, &job);
        assert!(matches!(result, Err(SpeechError::EmptyOutput)));
        assert!(!out.exists());
    }

    #[test]
    fn blank_chunks_are_skipped_but_counted() {
        let (mut engine, dir) = loaded_engine();
        let out = dir.path().join("book.wav");
        let job = job(&["aaaa", "   ", "bb"], out.clone());
        let (result, events) = run(&mut engine, &job);

        let result = result.expect("blank chunk must not fail the job");
        assert_eq!(result.chunk_count, 3);

        // Progress skips the blank chunk but keeps original indices.
        let indices: Vec<usize> = events.iter().map(|e| e.current).collect();
        assert_eq!(indices, vec![1, 3]);

        // Spacing identical to the failed-chunk case: one gap.
        let gap = (0.5 * SAMPLE_RATE as f32) as usize;
        let bytes = std::fs::read(&out).expect("artifact in test");
        assert_eq!(bytes.len(), 44 + 2 * (4 + gap + 2));
    }

    #[test]
    fn all_success_gaps_between_every_position() {
        let (mut engine, dir) = loaded_engine();
        let out = dir.path().join("book.wav");
        let job = job(&["aa", "bbb", "c"], out.clone());
        let (result, events) = run(&mut engine, &job);

        result.expect("all chunks succeed");
        let gap = (0.5 * SAMPLE_RATE as f32) as usize;
        let bytes = std::fs::read(&out).expect("artifact in test");
        // Two gaps between three successful chunks, none trailing.
        assert_eq!(bytes.len(), 44 + 2 * (2 + gap + 3 + gap + 1));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn unknown_voice_falls_back_but_missing_default_fails() {
        let (mut engine, dir) = loaded_engine();
        let out = dir.path().join("book.wav");
        let mut fallback_job = job(&["text"], out);
        fallback_job.voice = "not_in_store".to_owned();
        let (result, _) = run(&mut engine, &fallback_job);
        result.expect("fallback to default embedding");
    }

    #[test]
    fn unwritable_output_path_is_write_error() {
        let (mut engine, _dir) = loaded_engine();
        let job = job(&["hello"], PathBuf::from("/proc/definitely/not/writable/book.wav"));
        let (result, _) = run(&mut engine, &job);
        assert!(matches!(result, Err(SpeechError::Write(_))));
    }

    #[test]
    fn duration_counts_samples_over_rate() {
        let (mut engine, dir) = loaded_engine();
        let out = dir.path().join("book.wav");
        let job = job(&["aaaa"], out);
        let (result, _) = run(&mut engine, &job);
        let result = result.expect("single chunk job");
        let expected = 4.0 / f64::from(SAMPLE_RATE);
        assert!((result.duration_secs - expected).abs() < 1e-9);
    }
}
