// Retrieval-augmented answering for the municipal assistant.
// Orchestrates: follow-up resolution -> category detection -> embedding
// -> similarity search -> context assembly -> LLM answer -> usage log.

pub mod context;
pub mod engine;
pub mod indexer;
pub mod logger;
pub mod openai;

pub use context::{build_context, build_sources, build_transcript, Source};
pub use engine::{AnswerEngine, Answered, ChunkStore, EngineConfig, RagError, TokenUsage};
pub use indexer::{
    ingest_page, IndexStore, IndexSummary, IngestOutcome, PageIndexer, PageStore, ReindexStats,
};
pub use logger::{calculate_cost, hash_ip, Pricing, QueryLogSink, QueryLogger};
pub use openai::{
    ChatClient, ChatMessage, Completion, Embedding, EmbeddingBatch, EmbeddingClient, OpenAiClient,
    OpenAiError,
};
