//! Settings: which providers, stores and tunables the executor is built with.
//!
//! Filled from env vars (call `dotenv::dotenv().ok()` first to pick up `.env`). Every
//! variable is optional; with none set the executor runs on OpenAI `gpt-4o` if
//! `OPENAI_API_KEY` is present, an in-memory checkpoint store, the seeded passage store
//! and `./data/bio.db`.

use std::path::PathBuf;

use crate::nodes::{DEFAULT_MAX_HISTORY_MESSAGES, DEFAULT_TOP_K};

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///./data/bio.db";
/// Provider names `MODEL_PROVIDER` may take.
pub const PROVIDERS: [&str; 2] = ["openai", "ollama"];
pub const DEFAULT_OPENAI_MODELS: [&str; 2] = ["gpt-4o", "gpt-3.5-turbo"];
pub const DEFAULT_OLLAMA_MODELS: [&str; 2] = ["llama3", "mistral"];

/// Invalid value in the environment.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {key}: {value:?} ({reason})")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Executor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `MODEL_PROVIDER`: provider used when a request names none (`openai` or `ollama`).
    pub model_provider: String,
    /// `MODEL_NAME`: default model of the default provider.
    pub model_name: String,
    /// `OPENAI_API_KEY`: enables the `openai` provider.
    pub openai_api_key: Option<String>,
    /// `OPENAI_API_BASE`: OpenAI-compatible endpoint, e.g. a gateway.
    pub openai_api_base: Option<String>,
    /// `OPENAI_MODELS`: comma-separated models advertised for `openai`.
    pub openai_models: Vec<String>,
    /// `OLLAMA_BASE_URL`: enables the `ollama` provider (served through its `/v1` endpoint).
    pub ollama_base_url: Option<String>,
    /// `OLLAMA_MODELS`: comma-separated models advertised for `ollama`.
    pub ollama_models: Vec<String>,
    /// `DATABASE_URL`: catalog database, plain path or `sqlite:///path`.
    pub database_url: String,
    /// `CHECKPOINT_DB_PATH`: when set, thread state is kept in this SQLite file.
    pub checkpoint_db_path: Option<PathBuf>,
    /// `PASSAGES_PATH`: directory of `.txt`/`.md` knowledge-base files.
    pub passages_path: Option<PathBuf>,
    /// `RETRIEVAL_TOP_K`: passages per retrieval.
    pub retrieval_top_k: usize,
    /// `MAX_HISTORY_MESSAGES`: conversation history cap, 0 = unlimited.
    pub max_history_messages: usize,
    /// `USE_MOCK_LLM`: answer with a canned offline model instead of a real provider.
    pub use_mock_llm: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_provider: DEFAULT_PROVIDER.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            openai_api_key: None,
            openai_api_base: None,
            openai_models: DEFAULT_OPENAI_MODELS.iter().map(|m| m.to_string()).collect(),
            ollama_base_url: None,
            ollama_models: DEFAULT_OLLAMA_MODELS.iter().map(|m| m.to_string()).collect(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            checkpoint_db_path: None,
            passages_path: None,
            retrieval_top_k: DEFAULT_TOP_K,
            max_history_messages: DEFAULT_MAX_HISTORY_MESSAGES,
            use_mock_llm: false,
        }
    }
}

fn parse_usize(key: &'static str, value: String) -> Result<usize, ConfigError> {
    let parsed: Result<usize, _> = value.trim().parse();
    parsed.map_err(|e| ConfigError {
        key,
        reason: e.to_string(),
        value,
    })
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            key,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut s = Self::default();

        if let Some(v) = get("MODEL_PROVIDER") {
            let name = v.trim().to_lowercase();
            if !PROVIDERS.contains(&name.as_str()) {
                return Err(ConfigError {
                    key: "MODEL_PROVIDER",
                    value: v,
                    reason: format!("expected one of {}", PROVIDERS.join(", ")),
                });
            }
            s.model_provider = name;
        }
        if let Some(v) = get("MODEL_NAME") {
            s.model_name = v.trim().to_string();
        }
        s.openai_api_key = get("OPENAI_API_KEY");
        s.openai_api_base = get("OPENAI_API_BASE");
        if let Some(v) = get("OPENAI_MODELS") {
            s.openai_models = parse_list(&v);
        }
        s.ollama_base_url = get("OLLAMA_BASE_URL").map(|u| u.trim_end_matches('/').to_string());
        if let Some(v) = get("OLLAMA_MODELS") {
            s.ollama_models = parse_list(&v);
        }
        if let Some(v) = get("DATABASE_URL") {
            s.database_url = v;
        }
        s.checkpoint_db_path = get("CHECKPOINT_DB_PATH").map(PathBuf::from);
        s.passages_path = get("PASSAGES_PATH").map(PathBuf::from);
        if let Some(v) = get("RETRIEVAL_TOP_K") {
            s.retrieval_top_k = parse_usize("RETRIEVAL_TOP_K", v)?;
            if s.retrieval_top_k == 0 {
                return Err(ConfigError {
                    key: "RETRIEVAL_TOP_K",
                    value: "0".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if let Some(v) = get("MAX_HISTORY_MESSAGES") {
            s.max_history_messages = parse_usize("MAX_HISTORY_MESSAGES", v)?;
        }
        if let Some(v) = get("USE_MOCK_LLM") {
            s.use_mock_llm = parse_bool("USE_MOCK_LLM", v)?;
        }
        Ok(s)
    }
}
