//! Audio encoding and output.

pub mod output;
pub mod wav;

pub use output::{AudioOutput, NoopAudioOutput};
pub use wav::encode_wav;
