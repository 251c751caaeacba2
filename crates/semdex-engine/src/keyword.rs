//! Lexical-overlap fallback retrieval.
//!
//! Full substitute for the vector index when no embedding provider could be
//! initialized, not a secondary re-ranking stage.

use std::collections::HashSet;

use semdex_core::types::Chunk;

/// Score `chunks` against `query` by the number of distinct shared
/// lowercase words and return the best `k` as `(chunk_id, overlap_count)`.
///
/// Chunks with no overlap are excluded outright rather than ranked low; a
/// zero-overlap match would occupy a result slot without carrying any
/// retrieval value. Ties keep original chunk order (stable sort), so
/// results are deterministic.
pub fn search_keywords(chunks: &[Chunk], query: &str, k: usize) -> Vec<(usize, usize)> {
    let query_words = word_set(query);
    if query_words.is_empty() {
        return Vec::new();
    }
    let mut hits: Vec<(usize, usize)> = Vec::new();
    for chunk in chunks {
        let overlap = word_set(&chunk.text).intersection(&query_words).count();
        if overlap > 0 {
            hits.push((chunk.id, overlap));
        }
    }
    hits.sort_by(|a, b| b.1.cmp(&a.1));
    hits.truncate(k);
    hits
}

/// Distinct lowercase whitespace-separated words.
pub fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
