//! Domain types shared by the index and query engines.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;

/// A fixed-size, possibly overlapping span of the document's words, the
/// unit of retrieval.
///
/// - `id`: 0-based ordinal within the parent document
/// - `text`: the word span, single-space joined
///
/// Chunks are immutable once created; a new `setup_index` call replaces the
/// whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
}

/// Similarity regime of a vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Raw squared Euclidean distance; smaller is closer.
    SquaredL2,
    /// Inner product over L2-normalized vectors; larger is closer.
    /// Every vector must be normalized at insert and query time.
    NormalizedDot,
}

/// Which retrieval path answers queries for the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    Embedding,
    Keyword,
}

/// Coarse relevance label derived from a normalized similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    /// Band a normalized score using the configured thresholds.
    pub fn band(score: f32, scoring: &ScoringConfig) -> Self {
        if score > scoring.high_threshold {
            Relevance::High
        } else if score > scoring.medium_threshold {
            Relevance::Medium
        } else {
            Relevance::Low
        }
    }
}

impl std::fmt::Display for Relevance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relevance::High => write!(f, "High"),
            Relevance::Medium => write!(f, "Medium"),
            Relevance::Low => write!(f, "Low"),
        }
    }
}

/// One ranked passage returned by a query. Constructed fresh per query and
/// never stored.
///
/// `rank` is 1-based; `score` is normalized to [0,1] and non-increasing by
/// rank within one result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub rank: usize,
    pub chunk_text: String,
    pub score: f32,
    pub relevance: Relevance,
}
