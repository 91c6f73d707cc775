//! Run config: executor settings plus the per-request defaults. Filled from env / .env.

use biograph::{QueryRequest, Settings};

use super::RunOptions;

/// Error type used by the CLI library.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Executor settings and request defaults for one CLI invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Executor settings (providers, databases, tunables).
    pub settings: Settings,
    /// Provider requested for each query; `None` uses `MODEL_PROVIDER`.
    pub provider: Option<String>,
    /// Model requested for each query; `None` uses the provider's default.
    pub model: Option<String>,
    /// Thread to continue; `None` starts a new thread per query.
    pub thread_id: Option<String>,
}

impl RunConfig {
    /// Reads settings from the environment. Does not load `.env`; call `dotenv` first.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            settings: Settings::from_env()?,
            ..Default::default()
        })
    }

    /// Apply optional overrides from `RunOptions` to this config.
    ///
    /// A `top_k` of 0 is ignored so the retriever always returns at least one passage.
    pub fn apply_options(&mut self, options: &RunOptions) {
        if options.provider.is_some() {
            self.provider = options.provider.clone();
        }
        if options.model.is_some() {
            self.model = options.model.clone();
        }
        if options.thread_id.is_some() {
            self.thread_id = options.thread_id.clone();
        }
        if let Some(path) = &options.checkpoint_db {
            self.settings.checkpoint_db_path = Some(path.clone());
        }
        if let Some(url) = &options.database_url {
            self.settings.database_url = url.clone();
        }
        if let Some(k) = options.top_k.filter(|k| *k > 0) {
            self.settings.retrieval_top_k = k;
        }
        if options.mock_llm {
            self.settings.use_mock_llm = true;
        }
    }

    /// Request for `query` carrying this config's provider, model and thread.
    pub fn request(&self, query: &str) -> QueryRequest {
        QueryRequest {
            query: query.to_string(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            thread_id: self.thread_id.clone(),
        }
    }
}
