//! Sentence embedding providers.
//!
//! The real provider runs a local MiniLM-class sentence transformer through
//! candle; the hashing provider is a deterministic stand-in selected with
//! `SEMDEX_FAKE_EMBEDDINGS=1` for fast tests and development. Both are
//! reached through [`probe`], which attempts construction once and reports
//! the outcome as a [`Capability`].

pub mod device;
pub mod pool;
pub mod tokenize;

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use indicatif::{ProgressBar, ProgressStyle};
use tokenizers::Tokenizer;
use tracing::{info, warn};
use twox_hash::XxHash64;

use semdex_core::traits::{Capability, Embedder};

/// Dimension of the default MiniLM-class encoder; the hashing embedder uses
/// the same width so either provider can back the same index artifacts.
pub const ENCODER_DIM: usize = 384;

const ENCODER_MAX_LEN: usize = 256;

/// Local BERT-family sentence encoder with masked mean pooling and L2
/// normalization.
pub struct SentenceEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    id: String,
}

impl SentenceEncoder {
    /// Load tokenizer, config, and weights from `model_dir` (or the resolved
    /// default location). Any missing file fails construction; the caller
    /// decides whether that is fatal or a fallback trigger.
    pub fn new(model_dir: Option<PathBuf>) -> Result<Self> {
        let device = device::select_device();
        let model_dir = resolve_model_dir(model_dir)?;
        info!(dir = %model_dir.display(), "loading sentence-transformer");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            anyhow!("failed to load tokenizer from {}: {}", tokenizer_path.display(), e)
        })?;

        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&config_text)?;
        // The transformer config keeps its fields to itself; re-read the
        // one number the index needs.
        #[derive(serde::Deserialize)]
        struct EncoderDims {
            hidden_size: usize,
        }
        let dims: EncoderDims = serde_json::from_str(&config_text)?;

        let safetensors_path = model_dir.join("model.safetensors");
        let vb = if safetensors_path.exists() {
            unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors_path], DTYPE, &device)? }
        } else {
            let weights_path = model_dir.join("pytorch_model.bin");
            let tensors = candle_core::pickle::read_all(&weights_path)
                .with_context(|| format!("failed to read {}", weights_path.display()))?;
            let tensor_map: HashMap<String, Tensor> = tensors.into_iter().collect();
            VarBuilder::from_tensors(tensor_map, DTYPE, &device)
        };
        let model = BertModel::load(vb, &config)?;

        let dim = dims.hidden_size;
        let model_name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "model".to_string());
        info!(model = %model_name, dim, "sentence-transformer ready");
        Ok(Self {
            model,
            tokenizer,
            device,
            dim,
            id: format!("local:{model_name}:d{dim}"),
        })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) =
            tokenize::encode_padded(&self.tokenizer, text, ENCODER_MAX_LEN, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = pool::masked_mean_l2(&hidden, &attention_mask)?;
        let vector = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        Ok(vector)
    }
}

impl Embedder for SentenceEncoder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        ENCODER_MAX_LEN
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let pb = (texts.len() > 1).then(|| {
            let pb = ProgressBar::new(texts.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        });
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_one(text)?);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        Ok(vectors)
    }
}

/// Deterministic bag-of-words embedder: every lowercased token hashes into
/// one of `dim` buckets and the bucket counts are L2-normalized. Vectors
/// carry no semantics beyond token overlap, which is exactly what fast
/// deterministic tests need.
pub struct HashingEmbedder {
    dim: usize,
    id: String,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, id: format!("hashing:xxh64:d{dim}") }
    }
}

impl Embedder for HashingEmbedder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        usize::MAX
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            let mut v = vec![0f32; self.dim];
            for token in text.split_whitespace() {
                let mut hasher = XxHash64::with_seed(0);
                token.to_lowercase().hash(&mut hasher);
                let bucket = (hasher.finish() as usize) % self.dim;
                v[bucket] += 1.0;
            }
            let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
            for x in &mut v {
                *x /= norm;
            }
            vectors.push(v);
        }
        Ok(vectors)
    }
}

/// Attempt to construct the embedding provider once and report the outcome.
///
/// Callers cache the returned [`Capability`] for the whole session; a failed
/// model load is expensive and deterministic, so it is never retried.
pub fn probe(model_dir: Option<PathBuf>) -> Capability {
    if fake_embeddings_requested() {
        info!("using deterministic hashing embedder");
        return Capability::Available(Box::new(HashingEmbedder::new(ENCODER_DIM)));
    }
    match SentenceEncoder::new(model_dir) {
        Ok(encoder) => Capability::Available(Box::new(encoder)),
        Err(e) => {
            warn!(error = %e, "embedding model unavailable");
            Capability::Unavailable(e.to_string())
        }
    }
}

fn fake_embeddings_requested() -> bool {
    std::env::var("SEMDEX_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn resolve_model_dir(configured: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        if dir.exists() {
            return Ok(dir);
        }
        return Err(anyhow!("model directory {} does not exist", dir.display()));
    }
    if let Ok(dir) = std::env::var("SEMDEX_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    let default = Path::new("models/minilm");
    if default.exists() {
        return Ok(default.to_path_buf());
    }
    Err(anyhow!("could not locate a sentence-transformer model directory"))
}
