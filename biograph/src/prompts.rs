//! Fixed prompt templates used by the stage nodes and the query engine.

/// Intent classification prompt; `{query}` is replaced with the user query.
pub const INTENT_TEMPLATE: &str = r#"Analyze the following query and decide which system is best suited to handle it.

Query: "{query}"

Possible categories:
- SQL: the query explicitly asks for structured data from the database, such as GSE records, specific ids or sample counts. For example "How many samples does GSE10000 have" or "List all GSE records".
- RAG: the query asks for general knowledge, explanation or analysis that may exist in the knowledge base. For example "What is RNA-seq" or "Explain single-cell sequencing".
- BOTH: the query needs both structured data and knowledge-base information. For example "What did GSE10000 study, and on which platform".
- CHAT: the query is unrelated to bioinformatics: small talk, everyday questions or greetings. For example "Hello" or "What's the weather like today".
- UNKNOWN: the intent cannot be determined.

Note: knowledge questions ("What is...", "Explain...", "Describe...") are usually RAG.
Concrete data requests ("How many...", "List...", "Get...") are usually SQL.

Return only one word as the category: SQL, RAG, BOTH, CHAT or UNKNOWN
"#;

/// SQL generation prompt; `{schema}` and `{question}` are replaced.
pub const SQL_TEMPLATE: &str = r#"You are an SQL expert. Given the table schema and the question below, write one SQL query that answers the question.
Return only the plain SQL query, without code fences, comments or any explanation.

Schema:
{schema}

Question: {question}

SQL query:"#;

/// Retrieval answer prompt; `{context}` and `{query}` are replaced.
pub const RAG_TEMPLATE: &str = r#"Answer the question using the context below. If the context does not contain the relevant information, say that you cannot answer.

Context:
{context}

Question: {query}

Answer:"#;

/// System instruction for the conversational path.
pub const CHAT_SYSTEM_PROMPT: &str = "You are an AI assistant answering all kinds of user questions.
For everyday conversation unrelated to bioinformatics, give friendly, natural and helpful answers.
Keep answers short and clear.
If the user asks about earlier parts of the conversation, look at the message history and answer from it.";

pub fn intent_prompt(query: &str) -> String {
    INTENT_TEMPLATE.replace("{query}", query)
}

pub fn sql_prompt(schema: &str, question: &str) -> String {
    // The template's `{schema}` precedes the question, so replacen never touches user text.
    SQL_TEMPLATE
        .replace("{question}", question)
        .replacen("{schema}", schema, 1)
}

pub fn rag_prompt(context: &str, query: &str) -> String {
    RAG_TEMPLATE
        .replace("{query}", query)
        .replacen("{context}", context, 1)
}
