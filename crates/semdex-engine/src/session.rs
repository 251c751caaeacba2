use std::path::Path;

use tracing::{debug, info, warn};

use semdex_core::chunker;
use semdex_core::config::EngineConfig;
use semdex_core::error::{Error, Result};
use semdex_core::traits::Capability;
use semdex_core::types::{Chunk, Relevance, SearchMode, SearchResult};
use semdex_index::persist;
use semdex_index::score::to_score;
use semdex_index::FlatIndex;

use crate::keyword;

/// One indexing-and-retrieval session over a single document.
///
/// `setup_index` always replaces the whole prior state; `search` and
/// `similar_chunks` only borrow it. The `&mut self` / `&self` split means a
/// rebuild cannot start while a query against the old index is in flight,
/// which is the entire concurrency discipline this engine needs.
pub struct SearchSession {
    config: EngineConfig,
    capability: Option<Capability>,
    state: State,
}

enum State {
    Uninitialized,
    Indexed { chunks: Vec<Chunk>, backend: Backend },
}

enum Backend {
    Vector(FlatIndex),
    Keyword,
}

fn mode_of(backend: &Backend) -> SearchMode {
    match backend {
        Backend::Vector(_) => SearchMode::Embedding,
        Backend::Keyword => SearchMode::Keyword,
    }
}

/// Statistics about the indexed document and the structures serving it.
#[derive(Debug, Clone)]
pub struct IndexStats {
    pub num_chunks: usize,
    pub total_words: usize,
    pub avg_chunk_words: f32,
    pub provider: String,
    pub backend: String,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    /// Session with default configuration. The embedding capability is
    /// probed lazily on first use and the outcome cached for the session's
    /// lifetime.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config, capability: None, state: State::Uninitialized }
    }

    /// Session with an explicit, pre-probed capability. Lets tests and
    /// embedding callers pin the provider without touching the process
    /// environment.
    pub fn with_capability(config: EngineConfig, capability: Capability) -> Self {
        Self { config, capability: Some(capability), state: State::Uninitialized }
    }

    fn capability(&mut self) -> &Capability {
        let model_dir = self.config.model_dir();
        self.capability.get_or_insert_with(|| semdex_embed::probe(model_dir))
    }

    /// Index `document_text`, replacing any prior session state.
    ///
    /// An empty or whitespace-only document refuses to index and leaves the
    /// engine uninitialized. When the embedding capability is unavailable
    /// the session serves keyword retrieval instead; the degradation is
    /// visible through [`SearchSession::mode`] but is never an error.
    pub fn setup_index(&mut self, document_text: &str) -> Result<()> {
        self.state = State::Uninitialized;
        if document_text.trim().is_empty() {
            debug!("refusing to index an empty document");
            return Ok(());
        }
        let chunks: Vec<Chunk> =
            chunker::chunk_with(document_text, &self.config.chunking)?.collect();
        if chunks.is_empty() {
            return Ok(());
        }

        let metric = self.config.index.metric;
        let backend = match self.capability() {
            Capability::Available(embedder) => {
                let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
                match embedder.embed_batch(&texts) {
                    Ok(vectors) => Backend::Vector(FlatIndex::build(&vectors, metric)?),
                    Err(e) => {
                        warn!(error = %e, "embedding failed; serving keyword retrieval");
                        Backend::Keyword
                    }
                }
            }
            Capability::Unavailable(reason) => {
                warn!(reason = %reason, "embedding unavailable; serving keyword retrieval");
                Backend::Keyword
            }
        };

        info!(chunks = chunks.len(), mode = ?mode_of(&backend), "document indexed");
        self.state = State::Indexed { chunks, backend };
        Ok(())
    }

    /// Query the active index for the `top_k` most relevant chunks.
    ///
    /// An engine with nothing indexed and an empty query both return an
    /// empty list rather than an error, so callers never special-case
    /// "nothing indexed yet."
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let State::Indexed { chunks, backend } = &self.state else {
            return Ok(Vec::new());
        };
        if query.trim().is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        match backend {
            Backend::Vector(index) => self.search_vectors(index, chunks, query, top_k),
            Backend::Keyword => Ok(self.search_keywords(chunks, query, top_k)),
        }
    }

    fn search_vectors(
        &self,
        index: &FlatIndex,
        chunks: &[Chunk],
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let Some(Capability::Available(embedder)) = &self.capability else {
            // A vector backend only exists after a successful probe.
            return Err(Error::CapabilityUnavailable(
                "no embedding provider for an embedding-mode session".to_string(),
            ));
        };
        debug!(top_k, "embedding-mode query");
        let query_vec = embedder
            .embed_batch(&[query.to_string()])
            .map_err(|e| Error::CapabilityUnavailable(e.to_string()))?
            .remove(0);
        let hits = index.query(&query_vec, top_k)?;

        let results = hits
            .into_iter()
            .enumerate()
            .map(|(i, (id, raw))| {
                let score = to_score(index.metric(), raw);
                SearchResult {
                    rank: i + 1,
                    chunk_text: chunks[id].text.clone(),
                    score,
                    relevance: Relevance::band(score, &self.config.scoring),
                }
            })
            .collect();
        Ok(results)
    }

    fn search_keywords(&self, chunks: &[Chunk], query: &str, top_k: usize) -> Vec<SearchResult> {
        debug!(top_k, "keyword-mode query");
        let query_word_count = keyword::word_set(query).len();
        if query_word_count == 0 {
            return Vec::new();
        }
        let mut results = Vec::new();
        for (id, overlap) in keyword::search_keywords(chunks, query, top_k) {
            let score = (overlap as f32 / query_word_count as f32).min(1.0);
            // One shared word in a long query is noise, not relevance.
            if score < self.config.scoring.keyword_min_score {
                continue;
            }
            results.push(SearchResult {
                rank: results.len() + 1,
                chunk_text: chunks[id].text.clone(),
                score,
                relevance: Relevance::band(score, &self.config.scoring),
            });
        }
        results
    }

    /// Indexed chunks most similar to `text`, excluding any chunk whose
    /// text equals the input. Embedding mode only; keyword sessions and
    /// uninitialized engines return nothing.
    pub fn similar_chunks(&self, text: &str, top_k: usize) -> Result<Vec<String>> {
        let State::Indexed { chunks, backend: Backend::Vector(index) } = &self.state else {
            return Ok(Vec::new());
        };
        if text.trim().is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        let Some(Capability::Available(embedder)) = &self.capability else {
            return Ok(Vec::new());
        };
        let text_vec = embedder
            .embed_batch(&[text.to_string()])
            .map_err(|e| Error::CapabilityUnavailable(e.to_string()))?
            .remove(0);
        // Over-fetch by one so the input's own chunk can be dropped.
        let hits = index.query(&text_vec, top_k + 1)?;
        Ok(hits
            .into_iter()
            .filter(|(id, _)| chunks[*id].text != text)
            .take(top_k)
            .map(|(id, _)| chunks[id].text.clone())
            .collect())
    }

    /// Statistics over the indexed document, or `None` before any indexing.
    pub fn stats(&self) -> Option<IndexStats> {
        let State::Indexed { chunks, backend } = &self.state else {
            return None;
        };
        let total_words: usize = chunks.iter().map(|c| c.text.split_whitespace().count()).sum();
        let provider = match &self.capability {
            Some(Capability::Available(embedder)) => embedder.id().to_string(),
            _ => "none".to_string(),
        };
        let backend_desc = match backend {
            Backend::Vector(index) => format!("flat {:?} d{}", index.metric(), index.dim()),
            Backend::Keyword => "keyword overlap".to_string(),
        };
        Some(IndexStats {
            num_chunks: chunks.len(),
            total_words,
            avg_chunk_words: total_words as f32 / chunks.len() as f32,
            provider,
            backend: backend_desc,
        })
    }

    /// Retrieval mode of the active session, if anything is indexed.
    /// Capability loss is absorbed, not raised, so this is how callers and
    /// tests observe the degradation.
    pub fn mode(&self) -> Option<SearchMode> {
        match &self.state {
            State::Uninitialized => None,
            State::Indexed { backend, .. } => Some(mode_of(backend)),
        }
    }

    /// Persist the active vector index and chunk list to `path`.
    pub fn save_index(&self, path: &Path) -> Result<()> {
        match &self.state {
            State::Indexed { chunks, backend: Backend::Vector(index) } => {
                persist::save(index, chunks, path)
            }
            _ => Err(Error::InvalidConfig(
                "no vector index to save in this session".to_string(),
            )),
        }
    }

    /// Load a persisted artifact, replacing any prior session state.
    ///
    /// The loaded vectors keep the similarity regime they were built under.
    /// If the session's provider disagrees with the artifact's
    /// dimensionality the load aborts; without any provider the chunks
    /// still load and the session serves keyword retrieval.
    pub fn load_index(&mut self, path: &Path) -> Result<()> {
        let (index, chunks) = persist::load(path)?;
        let backend = match self.capability() {
            Capability::Available(embedder) => {
                if embedder.dim() != index.dim() {
                    return Err(Error::FormatMismatch(format!(
                        "artifact dimension {} does not match provider dimension {}",
                        index.dim(),
                        embedder.dim()
                    )));
                }
                Backend::Vector(index)
            }
            Capability::Unavailable(reason) => {
                warn!(reason = %reason, "embedding unavailable; loaded index serves keyword retrieval");
                Backend::Keyword
            }
        };
        info!(chunks = chunks.len(), mode = ?mode_of(&backend), "index loaded");
        self.state = State::Indexed { chunks, backend };
        Ok(())
    }
}
