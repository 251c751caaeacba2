//! On-disk index artifact.
//!
//! One JSON file holds everything needed to answer queries without
//! re-running the embedding provider: the ordered chunk texts, the flat
//! vector buffer, the dimension, and the similarity regime the vectors were
//! prepared for. A loaded index therefore scores with the regime it was
//! built under, not whatever the current configuration says.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use semdex_core::error::{Error, Result};
use semdex_core::types::{Chunk, Metric};

use crate::flat::FlatIndex;

/// Bumped whenever the artifact layout changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Artifact {
    version: u32,
    metric: Metric,
    dim: usize,
    chunks: Vec<String>,
    vectors: Vec<f32>,
}

/// Write the index and its chunk list to `path`, replacing any existing
/// artifact.
pub fn save(index: &FlatIndex, chunks: &[Chunk], path: &Path) -> Result<()> {
    if chunks.len() != index.len() {
        return Err(Error::InvalidConfig(format!(
            "chunk count ({}) does not match indexed vector count ({})",
            chunks.len(),
            index.len()
        )));
    }
    let artifact = Artifact {
        version: FORMAT_VERSION,
        metric: index.metric(),
        dim: index.dim(),
        chunks: chunks.iter().map(|c| c.text.clone()).collect(),
        vectors: index.raw().to_vec(),
    };
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), &artifact)?;
    info!(path = %path.display(), chunks = chunks.len(), "saved index artifact");
    Ok(())
}

/// Read an artifact back into a queryable index and its chunk list.
///
/// Structural checks fail with [`Error::FormatMismatch`] rather than
/// letting a truncated or foreign file produce silently wrong rankings.
pub fn load(path: &Path) -> Result<(FlatIndex, Vec<Chunk>)> {
    let file = File::open(path)?;
    let artifact: Artifact = serde_json::from_reader(BufReader::new(file))?;

    if artifact.version != FORMAT_VERSION {
        return Err(Error::FormatMismatch(format!(
            "artifact version {} is not supported (expected {})",
            artifact.version, FORMAT_VERSION
        )));
    }
    if artifact.dim == 0 {
        return Err(Error::FormatMismatch("artifact declares zero dimension".to_string()));
    }
    if artifact.vectors.len() != artifact.chunks.len() * artifact.dim {
        return Err(Error::FormatMismatch(format!(
            "vector buffer holds {} values, expected {} chunks x {} dims",
            artifact.vectors.len(),
            artifact.chunks.len(),
            artifact.dim
        )));
    }

    let chunks: Vec<Chunk> = artifact
        .chunks
        .into_iter()
        .enumerate()
        .map(|(id, text)| Chunk { id, text })
        .collect();
    let index = FlatIndex::from_parts(artifact.dim, artifact.metric, artifact.vectors);
    info!(path = %path.display(), chunks = chunks.len(), "loaded index artifact");
    Ok((index, chunks))
}
