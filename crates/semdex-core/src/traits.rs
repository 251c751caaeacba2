/// A batch text-to-vector encoder backed by a local model.
///
/// Implementations must return one vector per input, in input order, all of
/// dimension `dim()`.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g., `local:minilm:d384`).
    fn id(&self) -> &str;
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    /// Maximum token length accepted per input.
    fn max_len(&self) -> usize;
    /// Compute embeddings for a batch of input texts.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Outcome of probing the embedding capability.
///
/// Determined once at session start and carried as engine state, so
/// branching on mode is a plain conditional rather than a repeated fallible
/// model load.
pub enum Capability {
    Available(Box<dyn Embedder>),
    Unavailable(String),
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }
}
