use tracing::info;

use semdex_core::error::{Error, Result};
use semdex_core::types::Metric;

/// Exact nearest-neighbor index over a flat row-major vector buffer.
///
/// Owns the session's vectors outright; rebuilding for a new document
/// discards the previous instance entirely. In `NormalizedDot` mode every
/// row is L2-normalized at build time and every query vector at query time,
/// so the inner product is a true cosine — skipping either normalization
/// silently corrupts rankings, which is why it happens inside the index and
/// not at the call site.
pub struct FlatIndex {
    dim: usize,
    metric: Metric,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from one vector per chunk, in chunk order.
    pub fn build(vectors: &[Vec<f32>], metric: Metric) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(Error::InvalidConfig(
                "cannot build an index from zero vectors".to_string(),
            ));
        };
        let dim = first.len();
        if dim == 0 {
            return Err(Error::InvalidConfig("vector dimension must be positive".to_string()));
        }

        let mut data = Vec::with_capacity(vectors.len() * dim);
        for (i, v) in vectors.iter().enumerate() {
            if v.len() != dim {
                return Err(Error::InvalidConfig(format!(
                    "vector {} has dimension {}, expected {}",
                    i,
                    v.len(),
                    dim
                )));
            }
            data.extend_from_slice(v);
        }
        if metric == Metric::NormalizedDot {
            for row in data.chunks_mut(dim) {
                l2_normalize(row);
            }
        }

        info!(vectors = vectors.len(), dim, ?metric, "built flat index");
        Ok(Self { dim, metric, data })
    }

    /// Reassemble an index from persisted parts. The caller has already
    /// validated the buffer length; vectors were normalized (if applicable)
    /// before saving.
    pub(crate) fn from_parts(dim: usize, metric: Metric, data: Vec<f32>) -> Self {
        Self { dim, metric, data }
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// One indexed row by chunk id.
    pub fn row(&self, id: usize) -> &[f32] {
        &self.data[id * self.dim..(id + 1) * self.dim]
    }

    pub(crate) fn raw(&self) -> &[f32] {
        &self.data
    }

    /// Exact k-nearest search. Returns `(chunk_id, raw_measure)` pairs
    /// ordered best-first; the raw measure is a squared distance or an
    /// inner product depending on the metric. Asking for more neighbors
    /// than there are vectors returns them all.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(Error::InvalidConfig(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dim
            )));
        }

        let mut normalized;
        let query = match self.metric {
            Metric::SquaredL2 => query,
            Metric::NormalizedDot => {
                normalized = query.to_vec();
                l2_normalize(&mut normalized);
                normalized.as_slice()
            }
        };

        let mut hits: Vec<(usize, f32)> = self
            .data
            .chunks(self.dim)
            .enumerate()
            .map(|(id, row)| {
                let measure = match self.metric {
                    Metric::SquaredL2 => squared_l2(query, row),
                    Metric::NormalizedDot => dot(query, row),
                };
                (id, measure)
            })
            .collect();

        match self.metric {
            // Distances ascend, similarities descend.
            Metric::SquaredL2 => {
                hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            }
            Metric::NormalizedDot => {
                hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            }
        }
        hits.truncate(k);
        Ok(hits)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
