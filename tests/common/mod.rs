//! Shared collaborator fakes for integration tests.
#![allow(dead_code)]

use mayari::audio::AudioOutput;
use mayari::config::SpeechConfig;
use mayari::document::DocumentReader;
use mayari::engine::{
    Embedding, EmbeddingStoreLoader, MODEL_FILE, STORE_FILE, SynthesisBackend, Synthesizer,
    store_key,
};
use mayari::error::{Result, SpeechError};
use mayari::runtime::{Collaborators, RuntimeOptions, SpeechHandle, SpeechRuntime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Synthesizer that emits one sample per character and fails on any chunk
/// containing "FAIL".
pub struct TestSynth;

impl Synthesizer for TestSynth {
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
        Ok(vec![0.25; text.chars().count()])
    }
}

/// Backend counting load invocations, optionally sleeping to keep the
/// `Loading` state observable.
pub struct TestBackend {
    pub loads: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl TestBackend {
    pub fn new() -> Self {
        Self {
            loads: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            loads: Arc::new(AtomicUsize::new(0)),
            delay,
        }
    }
}

impl SynthesisBackend for TestBackend {
    fn load(&self, _model_path: &Path) -> Result<Box<dyn Synthesizer>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(Box::new(TestSynth))
    }
}

/// Store loader serving fixed voice ids, counting invocations.
pub struct TestStore {
    pub loads: Arc<AtomicUsize>,
    pub voices: Vec<String>,
}

impl TestStore {
    pub fn with_voices(ids: &[&str]) -> Self {
        Self {
            loads: Arc::new(AtomicUsize::new(0)),
            voices: ids.iter().map(|id| (*id).to_owned()).collect(),
        }
    }
}

impl EmbeddingStoreLoader for TestStore {
    fn load(&self, _store_path: &Path) -> Result<HashMap<String, Embedding>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .voices
            .iter()
            .map(|id| (store_key(id), vec![0.5_f32; 4]))
            .collect())
    }
}

/// Output device recording transport calls.
#[derive(Clone, Default)]
pub struct RecordingOutput {
    pub plays: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
    pub playing: Arc<AtomicBool>,
}

impl AudioOutput for RecordingOutput {
    fn play(&mut self, _wav_bytes: &[u8]) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn resume(&mut self) {
        self.playing.store(true, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// Reader serving fixed pages; the byte string `junk` fails to parse.
pub struct PagesReader(pub Vec<String>);

impl PagesReader {
    pub fn with_pages(pages: &[&str]) -> Self {
        Self(pages.iter().map(|p| (*p).to_owned()).collect())
    }
}

impl DocumentReader for PagesReader {
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        if bytes == b"junk" {
            return Err(SpeechError::DocumentRead("unrecognized document".into()));
        }
        Ok(self.0.clone())
    }
}

/// Write the model weights and embedding store files into `model_dir`.
pub fn provision_model(model_dir: &Path) {
    std::fs::create_dir_all(model_dir).expect("create model dir in test");
    std::fs::write(model_dir.join(MODEL_FILE), b"weights").expect("write weights in test");
    std::fs::write(model_dir.join(STORE_FILE), b"store").expect("write store in test");
}

/// Runtime options rooted in a temp directory.
pub fn options_in(root: &Path) -> RuntimeOptions {
    RuntimeOptions {
        config: SpeechConfig::default(),
        model_dir: root.join("kokoro-model"),
        outputs_dir: root.join("outputs"),
    }
}

pub struct TestRig {
    pub handle: SpeechHandle,
    pub backend_loads: Arc<AtomicUsize>,
    pub store_loads: Arc<AtomicUsize>,
    pub output: RecordingOutput,
    pub model_dir: PathBuf,
    pub outputs_dir: PathBuf,
}

/// Spawn a runtime with default fakes: all catalog voices present in the
/// store, a fast backend, a recording output, and a two-page document.
pub fn spawn_rig(root: &Path) -> TestRig {
    spawn_rig_with(root, TestBackend::new(), TestStore::with_voices(&["bf_emma", "bm_george"]))
}

pub fn spawn_rig_with(root: &Path, backend: TestBackend, store: TestStore) -> TestRig {
    let options = options_in(root);
    let model_dir = options.model_dir.clone();
    let outputs_dir = options.outputs_dir.clone();
    let backend_loads = Arc::clone(&backend.loads);
    let store_loads = Arc::clone(&store.loads);
    let output = RecordingOutput::default();

    let handle = SpeechRuntime::spawn(
        options,
        Collaborators {
            backend: Arc::new(backend),
            embeddings: Arc::new(store),
            output: Box::new(output.clone()),
            documents: Arc::new(PagesReader::with_pages(&["Page one\ntext.", "Page two"])),
        },
    );

    TestRig {
        handle,
        backend_loads,
        store_loads,
        output,
        model_dir,
        outputs_dir,
    }
}
