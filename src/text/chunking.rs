//! Sentence-aware text chunking for synthesis.
//!
//! The synthesis engine degrades on very long inputs, so utterances are cut
//! into chunks that respect sentence boundaries when possible, falling back
//! to word boundaries for a single oversized sentence.

/// Default maximum characters per chunk.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1_500;

/// Split text into sentences.
///
/// Whitespace is collapsed first; a sentence ends after `.`, `!` or `?`
/// followed by a space.
#[must_use]
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;
    while i < chars.len() {
        current.push(chars[i]);
        if matches!(chars[i], '.' | '!' | '?') && chars.get(i + 1) == Some(&' ') {
            push_trimmed(&mut sentences, &current);
            current.clear();
            i += 1; // consume the separating space
        }
        i += 1;
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

/// Split text into chunks of at most `max_chars` characters, keeping whole
/// sentences together when possible. A single sentence longer than the cap
/// is split at word boundaries instead.
#[must_use]
pub fn smart_chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0usize;

    for sentence in split_into_sentences(&collapsed) {
        let sentence_len = sentence.chars().count();

        if sentence_len > max_chars {
            if !current.is_empty() {
                chunks.push(current.join(" "));
                current.clear();
                current_len = 0;
            }
            split_words(&sentence, max_chars, &mut chunks);
            continue;
        }

        let added = sentence_len + usize::from(!current.is_empty());
        if !current.is_empty() && current_len + added > max_chars {
            chunks.push(current.join(" "));
            current_len = sentence_len;
            current = vec![sentence];
        } else {
            current_len += added;
            current.push(sentence);
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

/// Word-boundary fallback for one oversized sentence.
fn split_words(sentence: &str, max_chars: usize, chunks: &mut Vec<String>) {
    let mut words: Vec<&str> = Vec::new();
    let mut len = 0usize;
    for word in sentence.split(' ') {
        let word_len = word.chars().count();
        let added = word_len + usize::from(!words.is_empty());
        if !words.is_empty() && len + added > max_chars {
            chunks.push(words.join(" "));
            words = vec![word];
            len = word_len;
        } else {
            len += added;
            words.push(word);
        }
    }
    if !words.is_empty() {
        chunks.push(words.join(" "));
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_owned());
    }
}
