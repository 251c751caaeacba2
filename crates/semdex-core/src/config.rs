use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::types::Metric;

/// Layered configuration source: `config.toml` + `config.<env>.toml` +
/// `SEMDEX_*` environment variables.
pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("SEMDEX_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }
}

/// Chunker parameters: windows of `chunk_size` words advancing by
/// `chunk_size - overlap`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 128, overlap: 0 }
    }
}

/// Score thresholds. The relevance bands are a UI-facing categorization,
/// not a statistical guarantee; deployments may override them without
/// touching scoring logic.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Scores above this are banded High.
    pub high_threshold: f32,
    /// Scores above this (and not High) are banded Medium.
    pub medium_threshold: f32,
    /// Keyword-mode results below this score are dropped entirely.
    pub keyword_min_score: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            medium_threshold: 0.5,
            keyword_min_score: 0.1,
        }
    }
}

/// Vector index parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub metric: Metric,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { metric: Metric::NormalizedDot }
    }
}

/// Embedding model location. `SEMDEX_MODEL_DIR` overrides the configured
/// directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub dir: Option<String>,
}

/// Everything one engine session needs, resolved up front.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub chunking: ChunkingConfig,
    pub scoring: ScoringConfig,
    pub index: IndexConfig,
    pub model: ModelConfig,
}

impl EngineConfig {
    /// Extract the typed sections from a layered [`Config`], falling back to
    /// defaults for anything missing.
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunking: config.get("chunking").unwrap_or_default(),
            scoring: config.get("scoring").unwrap_or_default(),
            index: config.get("index").unwrap_or_default(),
            model: config.get("model").unwrap_or_default(),
        }
    }

    /// Resolved model directory, if any: `SEMDEX_MODEL_DIR` wins over the
    /// `[model] dir` setting.
    pub fn model_dir(&self) -> Option<PathBuf> {
        if let Ok(dir) = env::var("SEMDEX_MODEL_DIR") {
            return Some(expand_path(dir));
        }
        self.model.dir.as_deref().map(expand_path)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
