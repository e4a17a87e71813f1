use std::env;
use std::str::FromStr;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Missing required configuration: {}", key),
            ConfigError::Invalid(key, value) => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where chunks and documents are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

/// Which provider backs each model capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub db_pool_size: u32,
    pub embedding_provider: Provider,
    pub generation_provider: Provider,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub similarity_threshold: f32,
    pub search_top_k: usize,
    pub max_history: usize,
    pub max_prompt_chars: usize,
    pub max_upload_bytes: usize,
    pub embed_concurrency: usize,
    pub provider_timeout_secs: u64,
    pub ingest_workers: usize,
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(default),
    }
}

fn provider(key: &'static str, default: Provider) -> Result<Provider, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            _ => Err(ConfigError::Invalid(key, raw)),
        },
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => match raw.to_lowercase().as_str() {
                "memory" => StorageBackend::Memory,
                "postgres" => StorageBackend::Postgres,
                _ => return Err(ConfigError::Invalid("STORAGE_BACKEND", raw)),
            },
            Err(_) => StorageBackend::Postgres,
        };

        let database_url = env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let config = Self {
            port: parsed("PORT", 3000)?,
            storage_backend,
            database_url,
            db_pool_size: parsed("DB_POOL_SIZE", 10)?,
            embedding_provider: provider("EMBEDDING_PROVIDER", Provider::OpenAi)?,
            generation_provider: provider("GENERATION_PROVIDER", Provider::OpenAi)?,
            chunk_size: parsed("CHUNK_SIZE", 1000)?,
            chunk_overlap: parsed("CHUNK_OVERLAP", 200)?,
            similarity_threshold: parsed("SIMILARITY_THRESHOLD", 0.7)?,
            search_top_k: parsed("SEARCH_TOP_K", 5)?,
            max_history: parsed("MAX_HISTORY", 5)?,
            max_prompt_chars: parsed("MAX_PROMPT_CHARS", 12_000)?,
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            embed_concurrency: parsed("EMBED_CONCURRENCY", 4)?,
            provider_timeout_secs: parsed("PROVIDER_TIMEOUT_SECS", 30)?,
            ingest_workers: parsed("INGEST_WORKERS", 3)?,
        };

        if !(0.0..=1.0).contains(&config.similarity_threshold) {
            return Err(ConfigError::Invalid(
                "SIMILARITY_THRESHOLD",
                config.similarity_threshold.to_string(),
            ));
        }

        Ok(config)
    }
}
