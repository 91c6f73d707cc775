//! Optional overrides for a run (CLI flags or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options) and
//! [`run_with_options`](crate::run_with_options).

use std::path::PathBuf;

/// Optional overrides: request routing (provider, model, thread) and executor settings.
///
/// All fields are optional; only set fields override the base config (from env).
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Provider requested for the query; unavailable providers fall back to the default.
    pub provider: Option<String>,
    /// Model requested for the query.
    pub model: Option<String>,
    /// Thread to continue; a new one is created when unset.
    pub thread_id: Option<String>,
    /// Override `CHECKPOINT_DB_PATH`.
    pub checkpoint_db: Option<PathBuf>,
    /// Override `DATABASE_URL`.
    pub database_url: Option<String>,
    /// Override `RETRIEVAL_TOP_K`.
    pub top_k: Option<usize>,
    /// Answer with the offline model.
    pub mock_llm: bool,
}
