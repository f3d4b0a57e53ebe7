//! Word-bounded chunking for long documents.
//!
//! Text is split on whitespace into consecutive groups of at most
//! `max_words` words, each rejoined with single spaces. The sequence is lazy
//! and can be restarted by cloning the iterator.

use std::str::SplitWhitespace;

/// Default chunk size in words.
pub const DEFAULT_MAX_WORDS: usize = 1000;

/// One ordered, word-bounded slice of a larger text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    /// Position in the sequence, starting at 0
    pub index: usize,
    pub text: String,
    pub word_count: usize,
}

/// Lazy chunk sequence over borrowed text.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    words: SplitWhitespace<'a>,
    max_words: usize,
    index: usize,
}

impl Iterator for Chunks<'_> {
    type Item = ContentChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let mut text = String::new();
        let mut word_count = 0;
        for word in self.words.by_ref().take(self.max_words) {
            if word_count > 0 {
                text.push(' ');
            }
            text.push_str(word);
            word_count += 1;
        }
        if word_count == 0 {
            return None;
        }

        let chunk = ContentChunk {
            index: self.index,
            text,
            word_count,
        };
        self.index += 1;
        Some(chunk)
    }
}

/// Split `text` into chunks of at most `max_words` words. A zero limit is
/// treated as one word per chunk.
pub fn chunk_text(text: &str, max_words: usize) -> Chunks<'_> {
    Chunks {
        words: text.split_whitespace(),
        max_words: max_words.max(1),
        index: 0,
    }
}

/// Number of chunks `chunk_text` would produce.
pub fn chunk_count(text: &str, max_words: usize) -> usize {
    let words = text.split_whitespace().count();
    let max_words = max_words.max(1);
    (words + max_words - 1) / max_words
}
