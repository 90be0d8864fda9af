use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
    env_name: String,
}

impl Config {
    /// Loads `config.toml` + `config.<env>.toml` + `APP_*` from the working directory.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(base_dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base_dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment, base_dir: base_dir.to_path_buf(), env_name })
    }

    /// Wraps an already assembled figment; used by tests and embedders of the crate.
    pub fn from_figment(figment: Figment, base_dir: &Path) -> Self {
        Self { figment, base_dir: base_dir.to_path_buf(), env_name: "custom".to_string() }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed settings with relative paths resolved against the config directory.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        self.validate_for_env(&settings)?;
        settings.data.corpus_dir = resolve_with_base(&self.base_dir, settings.data.corpus_dir.to_string_lossy());
        settings.data.lancedb_dir = resolve_with_base(&self.base_dir, settings.data.lancedb_dir.to_string_lossy());
        if let Some(dir) = settings.embedding.model_dir.take() {
            settings.embedding.model_dir = Some(resolve_with_base(&self.base_dir, dir.to_string_lossy()));
        }
        Ok(settings)
    }

    fn validate_for_env(&self, settings: &Settings) -> Result<(), Error> {
        match self.env_name.as_str() {
            "prod" | "production" => {
                if settings.embedding.fake {
                    return Err(Error::InvalidConfig("fake embeddings are not allowed in production".into()));
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Squared euclidean distance; the relevance threshold default is tuned for it.
    #[default]
    L2,
    Cosine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    #[default]
    Cls,
    Mean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub index: IndexSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub retrieval: RetrievalSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub corpus_dir: PathBuf,
    pub lancedb_dir: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { corpus_dir: PathBuf::from("data"), lancedb_dir: PathBuf::from("lancedb_data") }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub table_name: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { table_name: "topics".to_string(), dimension: 1024, metric: DistanceMetric::L2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub fake: bool,
    pub model_dir: Option<PathBuf>,
    pub max_len: usize,
    pub batch_size: usize,
    pub pooling: Pooling,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { fake: false, model_dir: None, max_len: 512, batch_size: 16, pooling: Pooling::Cls, timeout_secs: 300 }
    }
}

impl EmbeddingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 90,
        }
    }
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Best-hit distance must be strictly below this to ground a roadmap.
    pub relevance_threshold: f32,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { relevance_threshold: 0.95, default_limit: 5, max_limit: 20 }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.index.table_name.trim().is_empty() {
            return Err(Error::InvalidConfig("index.table_name must not be empty".into()));
        }
        if self.index.dimension == 0 || self.index.dimension > i32::MAX as usize {
            return Err(Error::InvalidConfig(format!("index.dimension {} is out of range", self.index.dimension)));
        }
        if !self.retrieval.relevance_threshold.is_finite() || self.retrieval.relevance_threshold <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "retrieval.relevance_threshold must be a positive number, got {}",
                self.retrieval.relevance_threshold
            )));
        }
        if self.retrieval.max_limit == 0 {
            return Err(Error::InvalidConfig("retrieval.max_limit must be greater than zero".into()));
        }
        if self.retrieval.default_limit == 0 || self.retrieval.default_limit > self.retrieval.max_limit {
            return Err(Error::InvalidConfig(format!(
                "retrieval.default_limit must be within 1..={}, got {}",
                self.retrieval.max_limit, self.retrieval.default_limit
            )));
        }
        if self.embedding.batch_size == 0 || self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size and embedding.max_len must be positive".into()));
        }
        if self.embedding.timeout_secs == 0 || self.generation.timeout_secs == 0 {
            return Err(Error::InvalidConfig("timeouts must be at least one second".into()));
        }
        Ok(())
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

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
