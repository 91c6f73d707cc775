//! Run entry points: one query, thread management, provider and catalog listings.
//!
//! Each call builds only what its command needs from the config: the executor for a
//! query, the checkpoint store for thread commands and the registry for listings. The
//! CLI handles one command per process.

use std::sync::Arc;

use biograph::{
    build_checkpoint_store, build_executor, build_registry, CheckpointError, CheckpointStore,
    Executor, InvocationState, ProviderInfo, QueryResponse,
};

pub use crate::config::Error;
use crate::config::{RunConfig, RunOptions};

fn executor(config: &RunConfig) -> Result<Executor, Error> {
    Ok(build_executor(&config.settings)?)
}

fn store(config: &RunConfig) -> Result<Arc<dyn CheckpointStore<InvocationState>>, Error> {
    Ok(build_checkpoint_store(&config.settings)?)
}

/// Resolves `query` with config from env (after loading `.env`).
pub async fn run(query: &str) -> Result<QueryResponse, Error> {
    dotenv::dotenv().ok();
    let config = RunConfig::from_env()?;
    run_with_config(&config, query).await
}

/// Like [`run`], with `options` applied over the env config.
pub async fn run_with_options(query: &str, options: &RunOptions) -> Result<QueryResponse, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    run_with_config(&config, query).await
}

/// Resolves `query` with the given config; does not read `.env`.
///
/// Startup failures are errors; anything that happens during the run is reported in
/// the response (`error` field), never as `Err`.
pub async fn run_with_config(config: &RunConfig, query: &str) -> Result<QueryResponse, Error> {
    let executor = executor(config)?;
    Ok(executor.resolve(config.request(query)).await)
}

pub async fn list_threads(config: &RunConfig) -> Result<Vec<String>, Error> {
    Ok(store(config)?.list().await?)
}

/// Deletes a thread. The `CheckpointError` is kept so callers can tell `NotFound` apart.
pub async fn delete_thread(config: &RunConfig, thread_id: &str) -> Result<(), Error> {
    let store = store(config)?;
    let _guard = store.lock(thread_id).await;
    store
        .delete(thread_id)
        .await
        .map_err(|e: CheckpointError| Box::new(e) as Error)
}

pub async fn clear_threads(config: &RunConfig) -> Result<usize, Error> {
    Ok(store(config)?.clear().await?)
}

pub fn list_providers(config: &RunConfig) -> Result<Vec<ProviderInfo>, Error> {
    Ok(build_registry(&config.settings).providers())
}

#[cfg(feature = "sqlite")]
mod catalog;

#[cfg(feature = "sqlite")]
pub use catalog::{find_record, list_records};
