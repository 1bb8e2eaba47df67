//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (nested keys split on `__`, e.g.
//! `APP_RETRIEVAL__WEIGHTS__LEXICAL=0.5`). Provides helpers to expand `~` and
//! `${VAR}` and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> { Self::load_from(Path::new(".")) }

    /// Loads the layered configuration with `dir` as the location of the
    /// TOML files, then validates it. Invalid retrieval parameters fail here,
    /// before any query runs.
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.retrieval.validate()?;
        settings.corpus.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalConfig,
    pub corpus: CorpusConfig,
}

/// Knobs of the hybrid ranker.
///
/// `k` is the number of citations returned, `window_size` the number of fused
/// candidates that reach the rerank pass, `boost_weight` the weight of the
/// query-term overlap ratio added during rerank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub k: usize,
    pub window_size: usize,
    pub boost_weight: f64,
    pub snippet_chars: usize,
    pub max_query_chars: usize,
    pub weights: Weights,
    pub bm25: Bm25Params,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 5,
            window_size: 20,
            boost_weight: 0.25,
            snippet_chars: 240,
            max_query_chars: 1500,
            weights: Weights::default(),
            bm25: Bm25Params::default(),
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.bm25.validate()?;
        if self.k == 0 {
            return Err(Error::InvalidConfig("k must be at least 1".to_string()));
        }
        if self.window_size < self.k {
            return Err(Error::InvalidConfig(format!("window_size {} is smaller than k {}", self.window_size, self.k)));
        }
        if !self.boost_weight.is_finite() || self.boost_weight < 0.0 {
            return Err(Error::InvalidConfig(format!("boost_weight must be a non-negative number, got {}", self.boost_weight)));
        }
        if self.snippet_chars == 0 {
            return Err(Error::InvalidConfig("snippet_chars must be at least 1".to_string()));
        }
        if self.max_query_chars == 0 {
            return Err(Error::InvalidConfig("max_query_chars must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Fusion weights of the lexical and semantic signals. Must sum to 1.0 so
/// fused scores stay inside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub lexical: f64,
    pub semantic: f64,
}

impl Default for Weights {
    fn default() -> Self { Self { lexical: 0.45, semantic: 0.55 } }
}

impl Weights {
    pub fn validate(&self) -> Result<()> {
        validate_weight_set(&[self.lexical, self.semantic])
    }
}

/// Checks that every weight is finite and non-negative and that they sum to 1.
pub fn validate_weight_set(weights: &[f64]) -> Result<()> {
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(Error::InvalidWeights(format!("weight {w} is negative or not finite")));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(Error::InvalidWeights(format!("weights sum to {sum}, expected 1.0")));
    }
    Ok(())
}

/// BM25 term-saturation (`k1`) and length-normalization (`b`) constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: 1.5, b: 0.75 } }
}

impl Bm25Params {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::InvalidConfig(format!("bm25.k1 must be a non-negative number, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidConfig(format!("bm25.b must lie in [0, 1], got {}", self.b)));
        }
        Ok(())
    }
}

/// Where the directory-backed corpus lives and how its files are chunked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub root: String,
    pub chunk_words: usize,
    pub overlap_words: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self { root: "data/users".to_string(), chunk_words: 320, overlap_words: 60 }
    }
}

impl CorpusConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_words == 0 {
            return Err(Error::InvalidConfig("corpus.chunk_words must be at least 1".to_string()));
        }
        if self.overlap_words >= self.chunk_words {
            return Err(Error::InvalidConfig(format!(
                "corpus.overlap_words {} must be smaller than chunk_words {}",
                self.overlap_words, self.chunk_words
            )));
        }
        Ok(())
    }

    pub fn root_path(&self, base: &Path) -> PathBuf { resolve_with_base(base, &self.root) }
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

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
