use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::embedding::{Embedder, EmbeddingEngine, HashEmbedder};
use crate::llm::{GeminiClient, GenerativeModel, OpenAiClient};
use crate::pipeline::PipelineOptions;
use crate::storage::SqliteStore;
use crate::{Error, Result};

pub const ENV_DATABASE: &str = "CITYFAQ_DATABASE";
pub const ENV_THRESHOLD: &str = "SIMILARITY_THRESHOLD";
pub const ENV_LLM_MODEL: &str = "CITYFAQ_LLM_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityFaqConfig {
    pub database: PathBuf,
    pub city: String,
    pub threshold: f32,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
}

impl Default for CityFaqConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("cityfaq.db"),
            city: "Dubai".to_string(),
            threshold: crate::resolver::DEFAULT_THRESHOLD,
            embedding: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Fastembed,
    Hash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Vector size for the hash backend; fastembed's model fixes its own
    pub dimensions: usize,
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Fastembed,
            dimensions: 384,
            cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    Openai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            model: crate::llm::gemini::DEFAULT_GEMINI_MODEL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            endpoint: None,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!("{} not found in environment variables", self.api_key_env))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite busy timeout
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl CityFaqConfig {
    /// Apply environment overrides. `get` is usually `std::env::var(..).ok()`.
    pub fn apply_env<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = get(ENV_DATABASE) {
            self.database = PathBuf::from(db);
        }
        if let Some(raw) = get(ENV_THRESHOLD) {
            self.threshold = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} is not a number: {}", ENV_THRESHOLD, raw)))?;
        }
        if let Some(model) = get(ENV_LLM_MODEL) {
            self.llm.model = model;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !(-1.0..=1.0).contains(&self.threshold) {
            return Err(Error::Config(format!(
                "threshold must be within [-1, 1], got {}",
                self.threshold
            )));
        }
        if self.embedding.dimensions < HashEmbedder::MIN_DIMENSIONS {
            return Err(Error::Config(format!(
                "embedding.dimensions must be at least {}",
                HashEmbedder::MIN_DIMENSIONS
            )));
        }
        if self.llm.timeout_secs == 0 || self.store.timeout_ms == 0 {
            return Err(Error::Config("timeouts must be non-zero".to_string()));
        }
        if self.city.trim().is_empty() {
            return Err(Error::Config("city must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            threshold: self.threshold,
            city: self.city.clone(),
        }
    }

    /// Open the SQLite store with the configured busy timeout
    pub fn open_store(&self) -> Result<SqliteStore> {
        ensure_db_dir(&self.database)?;
        SqliteStore::open_with_timeout(&self.database, Duration::from_millis(self.store.timeout_ms))
    }

    pub fn build_embedder(&self) -> Result<Arc<dyn Embedder>> {
        Ok(match self.embedding.backend {
            EmbeddingBackend::Fastembed => {
                Arc::new(EmbeddingEngine::with_cache_dir(self.embedding.cache_dir.clone())?)
            }
            EmbeddingBackend::Hash => Arc::new(HashEmbedder::new(self.embedding.dimensions)),
        })
    }

    pub fn build_model(&self) -> Result<Arc<dyn GenerativeModel>> {
        let api_key = self.llm.api_key()?;
        let timeout = Duration::from_secs(self.llm.timeout_secs);
        let model = self.llm.model.clone();
        let endpoint = self.llm.endpoint.clone();

        Ok(match self.llm.provider {
            LlmProvider::Gemini => Arc::new(GeminiClient::new(api_key, model, endpoint, timeout)?),
            LlmProvider::Openai => Arc::new(OpenAiClient::new(api_key, model, endpoint, timeout)?),
        })
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("cityfaq.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CityFaqConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CityFaqConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// File (or defaults), then environment, then validation
pub fn resolve_config(path: Option<&Path>) -> anyhow::Result<CityFaqConfig> {
    let mut config = load_config(path)?.unwrap_or_default();
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &CityFaqConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
