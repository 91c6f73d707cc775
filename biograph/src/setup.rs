//! Wires an [`Executor`] from [`Settings`]: providers, catalog engine, passages, store.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Settings, DEFAULT_MODEL};
use crate::error::CapabilityError;
use crate::graph::CompilationError;
use crate::llm::{LlmClient, MockLlm, Provider, ProviderRegistry};
use crate::memory::{CheckpointError, CheckpointStore, MemoryCheckpointStore};
use crate::query::QueryEngine;
use crate::retrieval::{PassageStore, Retriever};
use crate::state::InvocationState;
use crate::workflow::{build_workflow_graph, Executor, WorkflowOptions};

/// Startup failure: nothing could be served.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("workflow graph: {0}")]
    Compilation(#[from] CompilationError),
}

/// Canned model used with `USE_MOCK_LLM`: classifies everything as BOTH and writes a
/// fixed catalog query, so every stage runs without network access.
pub fn offline_llm() -> MockLlm {
    MockLlm::new("This is an offline answer. Configure a model provider for real responses.")
        .when("Return only one word as the category", "BOTH")
        .when("SQL query:", "SELECT accession, title FROM gse")
}

fn mock_provider(name: &str, default_model: &str) -> Provider {
    Provider::new(name, default_model, |_model: &str| {
        Arc::new(offline_llm()) as Arc<dyn LlmClient>
    })
}

#[cfg(feature = "openai")]
fn openai_provider(settings: &Settings, default_model: &str) -> Provider {
    use async_openai::config::OpenAIConfig;

    use crate::llm::ChatOpenAI;

    let Some(key) = settings.openai_api_key.clone() else {
        return Provider::unavailable("openai", default_model);
    };
    let base = settings.openai_api_base.clone();
    Provider::new("openai", default_model, move |model: &str| {
        let mut config = OpenAIConfig::new().with_api_key(key.clone());
        if let Some(base) = &base {
            config = config.with_api_base(base.clone());
        }
        Arc::new(ChatOpenAI::with_config(config, model).with_temperature(0.0)) as Arc<dyn LlmClient>
    })
}

#[cfg(feature = "openai")]
fn ollama_provider(settings: &Settings, default_model: &str) -> Provider {
    use async_openai::config::OpenAIConfig;

    use crate::llm::ChatOpenAI;

    let Some(base_url) = settings.ollama_base_url.clone() else {
        return Provider::unavailable("ollama", default_model);
    };
    let api_base = format!("{}/v1", base_url);
    Provider::new("ollama", default_model, move |model: &str| {
        let config = OpenAIConfig::new()
            .with_api_key("ollama")
            .with_api_base(api_base.clone());
        Arc::new(ChatOpenAI::with_config(config, model).with_temperature(0.0)) as Arc<dyn LlmClient>
    })
}

#[cfg(not(feature = "openai"))]
fn openai_provider(_settings: &Settings, default_model: &str) -> Provider {
    Provider::unavailable("openai", default_model)
}

#[cfg(not(feature = "openai"))]
fn ollama_provider(_settings: &Settings, default_model: &str) -> Provider {
    Provider::unavailable("ollama", default_model)
}

/// Registry with `openai` and `ollama`. `MODEL_NAME` is the default model of the default
/// provider; the other provider defaults to the first model it advertises.
pub fn build_registry(settings: &Settings) -> ProviderRegistry {
    let default_for = |name: &str, models: &[String], fallback: &str| -> String {
        if settings.model_provider == name {
            settings.model_name.clone()
        } else {
            models.first().cloned().unwrap_or_else(|| fallback.to_string())
        }
    };
    let openai_model = default_for("openai", &settings.openai_models, DEFAULT_MODEL);
    let ollama_model = default_for("ollama", &settings.ollama_models, "llama3");

    let (openai, ollama) = if settings.use_mock_llm {
        (
            mock_provider("openai", &openai_model),
            mock_provider("ollama", &ollama_model),
        )
    } else {
        (
            openai_provider(settings, &openai_model),
            ollama_provider(settings, &ollama_model),
        )
    };

    let registry = ProviderRegistry::new(settings.model_provider.clone())
        .with_provider(openai.with_models(settings.openai_models.clone()))
        .with_provider(ollama.with_models(settings.ollama_models.clone()));
    for p in registry.providers() {
        info!(provider = %p.name, available = p.available, models = ?p.models, "llm provider");
    }
    registry
}

#[cfg(feature = "sqlite")]
fn build_query_engine(settings: &Settings) -> Result<Arc<dyn QueryEngine>, SetupError> {
    let engine = crate::query::SqliteQueryEngine::from_url(&settings.database_url)?;
    info!(path = %engine.path().display(), "catalog database");
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "sqlite"))]
fn build_query_engine(_settings: &Settings) -> Result<Arc<dyn QueryEngine>, SetupError> {
    warn!("built without sqlite; using the stand-in query engine");
    Ok(Arc::new(crate::query::MockQueryEngine::new("[]")))
}

fn build_retriever(settings: &Settings) -> Result<Arc<dyn Retriever>, SetupError> {
    let store = match &settings.passages_path {
        Some(dir) => PassageStore::load_dir(dir)?,
        None => PassageStore::seeded(),
    };
    Ok(Arc::new(store))
}

/// Checkpoint store: SQLite when `CHECKPOINT_DB_PATH` is set, in-memory otherwise.
pub fn build_checkpoint_store(
    settings: &Settings,
) -> Result<Arc<dyn CheckpointStore<InvocationState>>, SetupError> {
    match &settings.checkpoint_db_path {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CheckpointError::Storage(e.to_string()))?;
            }
            let store = crate::memory::SqliteCheckpointStore::new(path)?;
            info!(path = %path.display(), "sqlite checkpoint store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        Some(path) => {
            warn!(path = %path.display(), "built without sqlite; thread state stays in memory");
            Ok(Arc::new(MemoryCheckpointStore::new()))
        }
        None => Ok(Arc::new(MemoryCheckpointStore::new())),
    }
}

/// Builds the executor the CLI (or any other front end) serves queries with.
pub fn build_executor(settings: &Settings) -> Result<Executor, SetupError> {
    let registry = build_registry(settings);
    if registry.select(None, None).is_err() {
        warn!(
            provider = %settings.model_provider,
            "default llm provider is not configured; queries will fail until it is"
        );
    }
    let graph = build_workflow_graph(
        build_query_engine(settings)?,
        build_retriever(settings)?,
        WorkflowOptions {
            retrieval_top_k: settings.retrieval_top_k,
            max_history_messages: settings.max_history_messages,
        },
    )?;
    let store = build_checkpoint_store(settings)?;
    Ok(Executor::new(graph, store, registry))
}
