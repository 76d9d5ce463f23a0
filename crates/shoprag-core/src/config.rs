//! Layered configuration and path helpers.
//!
//! Uses Figment to merge compiled defaults + `config.toml` +
//! `config.<env>.toml` + `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_RETRIEVAL__TOP_K=3`). A `.env` file is loaded first so credentials
//! such as the LLM API key can live next to the binary.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::{Chunker, ChunkingConfig};
use crate::error::Error;

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(Path::new("."), &env_name)
    }

    /// Load with config files looked up in `base_dir` for the given env.
    pub fn load_for_env(base_dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base_dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, env_name: env_name.to_string() };
        config.settings()?;
        Ok(config)
    }

    pub fn env_name(&self) -> &str { &self.env_name }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract and validate the typed settings.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        if fake_embeddings_forced() {
            settings.embedding.use_fake = true;
        }
        settings.validate_for_env(&self.env_name)?;
        Ok(settings)
    }
}

fn fake_embeddings_forced() -> bool {
    env::var("APP_USE_FAKE_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSettings {
    pub products_csv: String,
    pub faqs_path: String,
    pub index_dir: String,
    pub meta_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            products_csv: "data/products.csv".to_string(),
            faqs_path: "data/faqs.md".to_string(),
            index_dir: "data/index".to_string(),
            meta_path: "data/meta.jsonl".to_string(),
        }
    }
}

impl DataSettings {
    pub fn products_csv(&self) -> PathBuf { expand_path(&self.products_csv) }
    pub fn faqs_path(&self) -> PathBuf { expand_path(&self.faqs_path) }
    pub fn index_dir(&self) -> PathBuf { expand_path(&self.index_dir) }
    pub fn meta_path(&self) -> PathBuf { expand_path(&self.meta_path) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub model_dir: String,
    pub max_len: usize,
    pub batch_size: usize,
    pub use_fake: bool,
    pub fake_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            max_len: 256,
            batch_size: 64,
            use_fake: false,
            fake_dim: 384,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self { Self { top_k: 5 } }
}

/// Chat-completions endpoint parameters. The model id is configuration;
/// no particular hosted model is assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub api_key_env: String,
    pub system_prompt: String,
    pub max_retries: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.2,
            timeout_secs: 30,
            api_key_env: "GROQ_API_KEY".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            max_retries: 0,
        }
    }
}

impl Settings {
    pub fn validate_for_env(&self, env: &str) -> crate::error::Result<()> {
        Chunker::from_config(&self.chunking)?;
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".to_string()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be at least 1".to_string()));
        }
        if self.embedding.max_len == 0 || self.embedding.fake_dim == 0 {
            return Err(Error::InvalidConfig("embedding.max_len and embedding.fake_dim must be at least 1".to_string()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::InvalidConfig(format!("llm.temperature {} is outside [0, 2]", self.llm.temperature)));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::InvalidConfig("llm.timeout_secs must be at least 1".to_string()));
        }
        match env {
            "prod" | "production" if self.embedding.use_fake => {
                Err(Error::InvalidConfig("fake embeddings are not allowed in production".to_string()))
            }
            _ => Ok(()),
        }
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
