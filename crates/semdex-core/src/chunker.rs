//! Fixed-size word-window chunking.
//!
//! Splits a document on whitespace and emits successive windows of
//! `chunk_size` words, advancing by `chunk_size - overlap` per step.
//! Fixed-size windows bound the embedding payload per chunk and keep the
//! scoring granularity uniform; overlap keeps context that a hard split
//! would sever mid-sentence.

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::Chunk;

/// Split `text` into word windows of `size` with `overlap` shared words
/// between adjacent windows.
///
/// The returned iterator is lazy and restartable (clone it to re-iterate);
/// it only reads `text`. A document with fewer than `size` words yields
/// exactly one chunk covering the whole text; an empty document yields no
/// chunks.
pub fn chunk(text: &str, size: usize, overlap: usize) -> Result<Chunks<'_>> {
    if size == 0 {
        return Err(Error::InvalidConfig("chunk size must be positive".to_string()));
    }
    if overlap >= size {
        return Err(Error::InvalidConfig(format!(
            "overlap ({overlap}) must be smaller than chunk size ({size})"
        )));
    }
    Ok(Chunks {
        words: text.split_whitespace().collect(),
        size,
        step: size - overlap,
        pos: 0,
        emitted: 0,
        done: false,
    })
}

/// [`chunk`] with parameters taken from a [`ChunkingConfig`].
pub fn chunk_with<'a>(text: &'a str, config: &ChunkingConfig) -> Result<Chunks<'a>> {
    chunk(text, config.chunk_size, config.overlap)
}

/// Lazy window iterator over a borrowed document.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    words: Vec<&'a str>,
    size: usize,
    step: usize,
    pos: usize,
    emitted: usize,
    done: bool,
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done || self.words.is_empty() {
            self.done = true;
            return None;
        }
        let start = self.pos;
        let end = (start + self.size).min(self.words.len());
        let chunk = Chunk {
            id: self.emitted,
            text: self.words[start..end].join(" "),
        };
        self.emitted += 1;
        if end == self.words.len() {
            // This window reached the end of the document; stop here rather
            // than emitting a trailing window that is pure overlap.
            self.done = true;
        } else {
            self.pos = start + self.step;
        }
        Some(chunk)
    }
}
