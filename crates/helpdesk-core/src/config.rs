//! Layered configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g. `APP_RERANK__TOP_N=8`).
//! Components receive the section they need at construction; nothing reads
//! configuration globally after start-up.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::Corpus;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&env::current_dir()?)
    }

    /// Load with `config.toml` and friends looked up in `dir`.
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

        let config = Self { figment, base_dir: dir.to_path_buf() };
        config.settings()?;
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

    /// Typed, validated settings with paths resolved against the config dir.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        settings.resolve_paths(&self.base_dir);
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalSettings,
    pub rerank: RerankSettings,
    pub generator: GeneratorSettings,
    pub audit: AuditSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Cleaned code/doc export: JSON array of `{content, source}`.
    pub code_json: String,
    /// Cleaned chat export: JSON array of `{author, timestamp, content, source}`.
    pub chat_json: String,
    pub lancedb_dir: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            code_json: "github_cleaned.json".to_string(),
            chat_json: "discord_cleaned.json".to_string(),
            lancedb_dir: "indexes/lancedb".to_string(),
        }
    }
}

impl DataSettings {
    pub fn export_for(&self, corpus: Corpus) -> &str {
        match corpus {
            Corpus::Code => &self.code_json,
            Corpus::Chat => &self.chat_json,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_id: String,
    /// Directory holding `config.json`, `tokenizer.json`, `model.safetensors`.
    pub model_dir: String,
    pub max_len: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            max_len: 256,
            batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub name: String,
    pub corpus: Corpus,
    pub table: String,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Queried in this order; the combined candidate list keeps it.
    pub sources: Vec<SourceSettings>,
    pub parallel: bool,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceSettings { name: "code".to_string(), corpus: Corpus::Code, table: "code_chunks".to_string(), top_k: 6 },
                SourceSettings { name: "chat".to_string(), corpus: Corpus::Chat, table: "chat_chunks".to_string(), top_k: 6 },
            ],
            parallel: false,
        }
    }
}

impl RetrievalSettings {
    pub fn source_for(&self, corpus: Corpus) -> Option<&SourceSettings> {
        self.sources.iter().find(|s| s.corpus == corpus)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankSettings {
    pub enabled: bool,
    pub model_id: String,
    pub model_dir: String,
    pub top_n: usize,
    /// Cap applied to the concatenated list when re-ranking is disabled.
    pub passthrough_cap: usize,
    pub max_len: usize,
}

impl Default for RerankSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model_id: "cross-encoder/ms-marco-MiniLM-L-6-v2".to_string(),
            model_dir: "models/ms-marco-MiniLM-L-6-v2".to_string(),
            top_n: 4,
            passthrough_cap: 12,
            max_len: 512,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Project the assistant supports; named in the instruction template.
    pub project_name: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 300,
            project_name: "Erigon".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub path: String,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self { path: "queries_and_answers.log".to_string() }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.retrieval.sources.is_empty() {
            return Err(Error::InvalidConfig("retrieval.sources must name at least one index".to_string()));
        }
        let mut names = HashSet::new();
        for source in &self.retrieval.sources {
            if !names.insert(source.name.as_str()) {
                return Err(Error::InvalidConfig(format!("duplicate retrieval source '{}'", source.name)));
            }
            if source.top_k == 0 {
                return Err(Error::InvalidConfig(format!("retrieval source '{}' has top_k = 0", source.name)));
            }
        }
        if self.rerank.top_n == 0 {
            return Err(Error::InvalidConfig("rerank.top_n must be positive".to_string()));
        }
        if self.rerank.passthrough_cap == 0 {
            return Err(Error::InvalidConfig("rerank.passthrough_cap must be positive".to_string()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be positive".to_string()));
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &str| resolve_with_base(base, p).to_string_lossy().into_owned();
        self.data.code_json = resolve(&self.data.code_json);
        self.data.chat_json = resolve(&self.data.chat_json);
        self.data.lancedb_dir = resolve(&self.data.lancedb_dir);
        self.embedding.model_dir = resolve(&self.embedding.model_dir);
        self.rerank.model_dir = resolve(&self.rerank.model_dir);
        self.audit.path = resolve(&self.audit.path);
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
