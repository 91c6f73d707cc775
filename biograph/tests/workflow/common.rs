//! Harness: executor over MockLlm, MockQueryEngine, MockRetriever and an in-memory store.

use std::sync::Arc;

use biograph::{
    build_workflow_graph, CheckpointStore, Executor, InvocationState, LlmClient,
    MemoryCheckpointStore, MockLlm, MockQueryEngine, MockRetriever, Provider, ProviderRegistry,
    QueryEngine, Retriever, WorkflowOptions,
};

/// Needle present only in the intent classification prompt.
pub const CLASSIFY: &str = "Return only one word as the category";
/// Needle present only in the SQL generation prompt.
pub const GENERATE_SQL: &str = "SQL query:";
/// Needle present only in the retrieval answer prompt.
pub const RAG_ANSWER: &str = "Answer:";

pub struct Harness {
    pub executor: Executor,
    pub llm: Arc<MockLlm>,
    pub engine: Arc<MockQueryEngine>,
    pub retriever: Arc<MockRetriever>,
    pub store: Arc<MemoryCheckpointStore<InvocationState>>,
}

/// LLM that classifies every query as `label` and answers each stage with a fixed text.
pub fn llm_classifying(label: &str) -> MockLlm {
    MockLlm::new("chat reply")
        .when(CLASSIFY, label)
        .when(GENERATE_SQL, "SELECT COUNT(*) FROM gse")
        .when(RAG_ANSWER, "rag reply")
}

pub fn registry_with(llm: Arc<MockLlm>) -> ProviderRegistry {
    ProviderRegistry::new("openai")
        .with_provider(
            Provider::new("openai", "gpt-4o", move |_| llm.clone() as Arc<dyn LlmClient>)
                .with_models(["gpt-3.5-turbo"]),
        )
        .with_provider(Provider::unavailable("ollama", "llama3").with_models(["mistral"]))
}

pub fn harness_with(llm: MockLlm, engine: MockQueryEngine, retriever: MockRetriever) -> Harness {
    let llm = Arc::new(llm);
    let engine = Arc::new(engine);
    let retriever = Arc::new(retriever);
    let store = Arc::new(MemoryCheckpointStore::new());
    let graph = build_workflow_graph(
        engine.clone() as Arc<dyn QueryEngine>,
        retriever.clone() as Arc<dyn Retriever>,
        WorkflowOptions::default(),
    )
    .expect("workflow graph compiles");
    let executor = Executor::new(
        graph,
        store.clone() as Arc<dyn CheckpointStore<InvocationState>>,
        registry_with(llm.clone()),
    );
    Harness {
        executor,
        llm,
        engine,
        retriever,
        store,
    }
}

/// Harness whose LLM classifies as `label`; engine returns `[(2)]`, retriever one passage.
pub fn harness(label: &str) -> Harness {
    harness_with(
        llm_classifying(label),
        MockQueryEngine::new("[(2)]"),
        MockRetriever::new(["GEO stores expression data."]),
    )
}
