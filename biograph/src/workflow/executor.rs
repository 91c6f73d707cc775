//! Executor: one entry point per query, per-thread state around each graph run.
//!
//! `resolve` never fails. Failures contained by nodes show up as degraded text in the
//! answer; anything that escapes the graph (or happens around it) becomes a response with
//! `error` set and intent `"error"`, and nothing is persisted for that run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::AgentError;
use crate::graph::{CompiledStateGraph, RunContext, RunOutcome};
use crate::llm::{ProviderInfo, ProviderRegistry};
use crate::memory::{Checkpoint, CheckpointError, CheckpointStore};
use crate::state::InvocationState;

/// Answer used when a run ends without any answer text.
pub const EMPTY_ANSWER: &str = "Unable to process the query, please try another question.";

/// Intent reported when the run failed outside the nodes.
pub const ERROR_INTENT: &str = "error";

/// One query. `provider`/`model` default to the configured ones; `thread_id` to a new id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Result envelope of `Executor::resolve`. `answer` and `thread_id` are always set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub intent: String,
    pub sql_result: Option<String>,
    pub rag_result: Option<String>,
    pub provider: String,
    pub model: String,
    pub thread_id: String,
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything known about one run: the thread, who served it and how it ended.
#[derive(Debug)]
pub struct Resolution {
    pub thread_id: String,
    pub provider: String,
    pub model: String,
    pub outcome: Result<RunOutcome<InvocationState>, AgentError>,
}

impl Resolution {
    pub fn into_response(self) -> QueryResponse {
        match self.outcome {
            Ok(outcome) => {
                let state = outcome.state;
                QueryResponse {
                    answer: state.answer.unwrap_or_else(|| EMPTY_ANSWER.to_string()),
                    intent: state
                        .intent
                        .map(|i| i.as_str())
                        .unwrap_or("unknown")
                        .to_string(),
                    sql_result: state.sql_answer,
                    rag_result: state.rag_answer,
                    provider: state.model_provider,
                    model: state.model_name,
                    thread_id: self.thread_id,
                    error: None,
                }
            }
            Err(e) => QueryResponse {
                answer: format!("Error while processing the query: {}", e),
                intent: ERROR_INTENT.to_string(),
                sql_result: None,
                rag_result: None,
                provider: self.provider,
                model: self.model,
                thread_id: self.thread_id,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Runs the compiled workflow against a shared checkpoint store.
///
/// Built once at startup; cheap to share behind an `Arc`.
///
/// **Interaction**: Owns the graph from `build_workflow_graph`, the store passed in by
/// `build_executor` and the provider registry used to pick each run's LLM.
pub struct Executor {
    graph: CompiledStateGraph<InvocationState>,
    store: Arc<dyn CheckpointStore<InvocationState>>,
    registry: ProviderRegistry,
}

impl Executor {
    pub fn new(
        graph: CompiledStateGraph<InvocationState>,
        store: Arc<dyn CheckpointStore<InvocationState>>,
        registry: ProviderRegistry,
    ) -> Self {
        Self {
            graph,
            store,
            registry,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.registry.providers()
    }

    /// Answers one query. Never fails; see the module docs for the failure envelope.
    pub async fn resolve(&self, request: QueryRequest) -> QueryResponse {
        self.resolve_detailed(request).await.into_response()
    }

    /// Like `resolve`, but keeps the run outcome (visited path, contained failures).
    pub async fn resolve_detailed(&self, request: QueryRequest) -> Resolution {
        let thread_id = request
            .thread_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let span = info_span!("resolve", thread_id = %thread_id);
        self.run_thread(request, thread_id).instrument(span).await
    }

    async fn run_thread(&self, request: QueryRequest, thread_id: String) -> Resolution {
        let requested_provider = request
            .provider
            .clone()
            .unwrap_or_else(|| self.registry.default_provider().to_string());
        let requested_model = request
            .model
            .clone()
            .or_else(|| self.registry.default_model().map(str::to_string))
            .unwrap_or_default();

        if request.query.trim().is_empty() {
            warn!("rejected empty query");
            return Resolution {
                thread_id,
                provider: requested_provider,
                model: requested_model,
                outcome: Err(AgentError::EmptyQuery),
            };
        }

        let selection = match self
            .registry
            .select(request.provider.as_deref(), request.model.as_deref())
        {
            Ok(selection) => selection,
            Err(e) => {
                warn!(error = %e, "no llm available for the run");
                return Resolution {
                    thread_id,
                    provider: requested_provider,
                    model: requested_model,
                    outcome: Err(e.into()),
                };
            }
        };
        let provider = selection.provider.clone();
        let model = selection.model.clone();
        let ctx = RunContext::new(thread_id.clone(), selection.client);

        let outcome = self.run_locked(&request.query, &ctx, &provider, &model).await;
        match &outcome {
            Ok(o) => info!(
                path = ?o.path,
                contained_failures = o.failures.len(),
                provider = %provider,
                model = %model,
                "query resolved"
            ),
            Err(e) => warn!(error = %e, "query failed"),
        }

        Resolution {
            thread_id,
            provider,
            model,
            outcome,
        }
    }

    /// Load → run → persist while holding the thread lock.
    async fn run_locked(
        &self,
        query: &str,
        ctx: &RunContext,
        provider: &str,
        model: &str,
    ) -> Result<RunOutcome<InvocationState>, AgentError> {
        let thread_id = ctx.thread_id.as_str();
        let _guard = self.store.lock(thread_id).await;

        let previous = self.store.get(thread_id).await?;
        if previous.is_none() {
            info!("new thread");
        }
        let history = previous
            .as_ref()
            .map(|cp| cp.channel_values.messages.clone())
            .unwrap_or_default();

        let state = InvocationState::new(query, thread_id, provider, model, history);
        let mut outcome = self.graph.invoke(state, ctx).await?;
        if outcome.state.answer.as_deref().map_or(true, str::is_empty) {
            outcome.state.answer = Some(EMPTY_ANSWER.to_string());
        }

        let (source, step) = Checkpoint::next_step(previous.as_ref());
        let checkpoint = Checkpoint::from_state(outcome.state.clone(), source, step);
        self.store.put(thread_id, &checkpoint).await?;
        Ok(outcome)
    }

    /// Thread ids with stored state, sorted.
    pub async fn list_threads(&self) -> Result<Vec<String>, CheckpointError> {
        self.store.list().await
    }

    /// Deletes one thread; `CheckpointError::NotFound` when it does not exist.
    pub async fn delete_thread(&self, thread_id: &str) -> Result<(), CheckpointError> {
        let guard = self.store.lock(thread_id).await;
        let result = self.store.delete(thread_id).await;
        drop(guard);
        if result.is_ok() {
            info!(thread_id = %thread_id, "thread deleted");
        }
        result
    }

    /// Deletes every thread and returns how many there were.
    ///
    /// Runs in flight are not waited for; each one persists its thread when it finishes.
    pub async fn clear_threads(&self) -> Result<usize, CheckpointError> {
        let n = self.store.clear().await?;
        info!(deleted = n, "threads cleared");
        Ok(n)
    }
}
