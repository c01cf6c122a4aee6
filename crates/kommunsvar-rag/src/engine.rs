// Answer engine
// Orchestrates: Follow-up resolution -> Category detection -> Embedding
// -> Similarity search -> Context assembly -> LLM answer

use crate::context::{build_context, build_sources, build_transcript, distinct_page_ids, Source};
use crate::openai::{ChatClient, ChatMessage, EmbeddingClient, OpenAiError};
use async_trait::async_trait;
use kommunsvar_core::{resolve_category, Category, ConversationTurn};
use kommunsvar_store::{ChunkMatch, MatchRequest, PageMeta, StoreError, SupabaseClient};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("OpenAI error: {0}")]
    OpenAi(#[from] OpenAiError),

    #[error("Search failed: {0}")]
    Search(#[from] StoreError),
}

/// Retrieval side of the datastore, abstracted for test doubles.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    async fn match_chunks(&self, request: &MatchRequest) -> Result<Vec<ChunkMatch>, StoreError>;
    async fn pages_by_ids(&self, tenant_id: Uuid, ids: &[i64])
        -> Result<Vec<PageMeta>, StoreError>;
}

#[async_trait]
impl ChunkStore for SupabaseClient {
    async fn match_chunks(&self, request: &MatchRequest) -> Result<Vec<ChunkMatch>, StoreError> {
        SupabaseClient::match_chunks(self, request).await
    }

    async fn pages_by_ids(
        &self,
        tenant_id: Uuid,
        ids: &[i64],
    ) -> Result<Vec<PageMeta>, StoreError> {
        SupabaseClient::pages_by_ids(self, tenant_id, ids).await
    }
}

// Engine configuration. Threshold and match count are the empirically
// fixed production values.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub tenant_id: Uuid,
    pub similarity_threshold: f32,
    pub match_count: u32,
}

impl EngineConfig {
    pub fn new(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            similarity_threshold: 0.35,
            match_count: 5,
        }
    }
}

/// Token counts accumulated across the embedding and generation calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub embedding_tokens: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// The engine's result for one query.
#[derive(Debug, Clone)]
pub struct Answered {
    pub answer: String,
    pub sources: Vec<Source>,
    pub detected_category: Option<Category>,
    pub chunks_found: usize,
    pub usage: TokenUsage,
}

// Main engine. Clients are injected so tests can substitute doubles.
pub struct AnswerEngine {
    config: EngineConfig,
    embedder: Arc<dyn EmbeddingClient>,
    chat: Arc<dyn ChatClient>,
    store: Arc<dyn ChunkStore>,
}

impl AnswerEngine {
    pub fn new(
        config: EngineConfig,
        embedder: Arc<dyn EmbeddingClient>,
        chat: Arc<dyn ChatClient>,
        store: Arc<dyn ChunkStore>,
    ) -> Self {
        Self {
            config,
            embedder,
            chat,
            store,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answer one query against the tenant's indexed pages.
    pub async fn answer(
        &self,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<Answered, RagError> {
        // Step 1: category, via the follow-up resolver
        let category = resolve_category(query, history);
        info!(query = %query, category = ?category.map(|c| c.label()), "category resolved");

        // Step 2: embed the literal query
        let embedding = self.embedder.embed(query).await?;

        // Step 3: similarity search (tenant + optional category filter)
        let matches = self
            .store
            .match_chunks(&MatchRequest {
                tenant_id: self.config.tenant_id,
                query_embedding: embedding.vector,
                category,
                similarity_threshold: self.config.similarity_threshold,
                match_count: self.config.match_count,
            })
            .await?;
        info!(chunks = matches.len(), "chunks retrieved");

        // Step 4: source metadata for the distinct pages
        let page_ids = distinct_page_ids(&matches);
        let pages = self
            .store
            .pages_by_ids(self.config.tenant_id, &page_ids)
            .await?;

        // Step 5: context + sources + transcript
        let context = build_context(&matches);
        let sources = build_sources(&matches, &pages);
        let transcript = build_transcript(history);

        // Step 6: generation. An empty context is not an error; the
        // instruction tells the model to say so or ask a clarifying
        // question.
        let messages = [
            ChatMessage::system(build_instruction(query, &context, &transcript)),
            ChatMessage::user(query),
        ];
        let completion = self.chat.complete(&messages).await?;

        Ok(Answered {
            answer: completion.text,
            sources,
            detected_category: category,
            chunks_found: matches.len(),
            usage: TokenUsage {
                embedding_tokens: embedding.tokens,
                prompt_tokens: completion.prompt_tokens,
                completion_tokens: completion.completion_tokens,
            },
        })
    }
}

fn build_instruction(query: &str, context: &str, transcript: &str) -> String {
    let conversation_block = if transcript.is_empty() {
        String::new()
    } else {
        format!(
            "=== TIDIGARE KONVERSATION ===\n{}\n=== SLUT PÅ TIDIGARE KONVERSATION ===\n\n",
            transcript
        )
    };

    format!(
        r#"Du är en hjälpsam assistent för Sandvikens kommun. Svara direkt på frågan på svenska utan att börja med hälsningar som "Hej" eller liknande. Ge ett naturligt och hjälpsamt svar baserat på kontexten nedan.

{conversation_block}Använd ENBART information från kontexten nedan. Om svaret inte finns där, säg "Jag hittar inte det i källorna." eller ställ en förtydligande motfråga.

VIKTIGT OM KORTA SVAR:
- Om användaren svarar "ja", "ok", "gärna" eller liknande - kolla i tidigare konversationen vad de frågade om och ge mer detaljer om det ämnet

Ditt svar ska vara:
- Vänligt och informativt i tonen
- Ge gärna lite extra information som kan vara relevant
- Avsluta gärna med en följdfråga om användaren kan behöva mer hjälp

VIKTIGT:
- Börja INTE svaret med "Hej" eller andra hälsningar
- Inkludera INTE käll-URL:er i ditt svar (de visas separat)
- Upprepa INTE frågan i ditt svar

Aktuell fråga: "{query}"

=== KONTEXT START ===
{context}
=== KONTEXT SLUT ==="#,
        context = if context.is_empty() {
            "Ingen relevant information hittades."
        } else {
            context
        },
    )
}
