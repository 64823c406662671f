//! Text processing for extracted document text.

pub mod chunking;
pub mod normalize;

pub use chunking::{smart_chunk_text, split_into_sentences};
pub use normalize::{normalize, normalize_pages};
