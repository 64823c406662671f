//! Centralized application directory paths.
//!
//! Single source of truth for the filesystem layout. Uses the [`dirs`] crate
//! for platform-appropriate resolution, which is sandbox-transparent on macOS
//! (returns container-relative paths under App Sandbox automatically).
//!
//! # Directory Layout
//!
//! | Purpose | macOS (sandbox) | Linux |
//! |---------|----------------|-------|
//! | App data | `~/Library/Application Support/mayari/` | `~/.local/share/mayari/` |
//! | Config | `~/Library/Application Support/mayari/` | `~/.config/mayari/` |
//!
//! # Environment Overrides
//!
//! - `MAYARI_DATA_DIR` — overrides [`data_dir`]
//! - `MAYARI_CONFIG_DIR` — overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Holds the model resources and generated audio artifacts. Resolves to
/// `dirs::data_dir()/mayari/` by default; override with `MAYARI_DATA_DIR`.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("MAYARI_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("mayari"))
        .unwrap_or_else(|| PathBuf::from("/tmp/mayari-data"))
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/mayari/` by default; override with
/// `MAYARI_CONFIG_DIR`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("MAYARI_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("mayari"))
        .unwrap_or_else(|| PathBuf::from("/tmp/mayari-config"))
}

/// Model resource directory (`data_dir()/kokoro-model/`).
///
/// Contains the model weights file and the voice embedding store.
#[must_use]
pub fn model_dir() -> PathBuf {
    data_dir().join("kokoro-model")
}

/// Generated audio artifact directory (`data_dir()/outputs/`).
#[must_use]
pub fn outputs_dir() -> PathBuf {
    data_dir().join("outputs")
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
