// Ingestion-side pipeline: page upserts gated by content hash, and
// chunk + embed + replace per page. Chunks are regenerated wholesale
// for a page; there is no incremental update.

use crate::engine::RagError;
use crate::openai::EmbeddingClient;
use async_trait::async_trait;
use kommunsvar_core::{chunks, classify_url, Category, ChunkConfig};
use kommunsvar_store::{NewChunk, NewPage, Page, StoreError, SupabaseClient};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Page-side writes used by ingestion.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn page_hash(&self, tenant_id: Uuid, url: &str) -> Result<Option<String>, StoreError>;
    async fn upsert_page(&self, page: &NewPage) -> Result<(), StoreError>;
}

#[async_trait]
impl PageStore for SupabaseClient {
    async fn page_hash(&self, tenant_id: Uuid, url: &str) -> Result<Option<String>, StoreError> {
        SupabaseClient::page_hash(self, tenant_id, url).await
    }

    async fn upsert_page(&self, page: &NewPage) -> Result<(), StoreError> {
        SupabaseClient::upsert_page(self, page).await
    }
}

/// Chunk-side writes used by reindexing.
#[async_trait]
pub trait IndexStore: Send + Sync {
    async fn list_pages(&self, tenant_id: Uuid) -> Result<Vec<Page>, StoreError>;
    async fn replace_chunks(
        &self,
        tenant_id: Uuid,
        page_id: i64,
        chunks: Vec<NewChunk>,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl IndexStore for SupabaseClient {
    async fn list_pages(&self, tenant_id: Uuid) -> Result<Vec<Page>, StoreError> {
        SupabaseClient::list_pages(self, tenant_id).await
    }

    async fn replace_chunks(
        &self,
        tenant_id: Uuid,
        page_id: i64,
        chunks: Vec<NewChunk>,
    ) -> Result<(), StoreError> {
        SupabaseClient::replace_chunks(self, tenant_id, page_id, &chunks).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Same content hash as the stored row; nothing written.
    Unchanged,
    /// New or changed page; the row was upserted.
    Stored,
}

/// Upsert a page only when its content hash changed. Keeps re-ingestion
/// of an unchanged site idempotent.
pub async fn ingest_page(store: &dyn PageStore, page: &NewPage) -> Result<IngestOutcome, StoreError> {
    let existing = store.page_hash(page.tenant_id, &page.url).await?;
    if existing.as_deref() == Some(page.hash.as_str()) {
        info!(url = %page.url, "unchanged, skipping");
        return Ok(IngestOutcome::Unchanged);
    }
    store.upsert_page(page).await?;
    info!(url = %page.url, title = %page.title, "page stored");
    Ok(IngestOutcome::Stored)
}

/// Summary of one indexed page.
#[derive(Debug, Clone)]
pub struct IndexSummary {
    pub chunks: usize,
    pub category: Category,
}

/// Counters for a full reindex run. Category labels map to page counts.
#[derive(Debug, Default)]
pub struct ReindexStats {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub per_category: BTreeMap<&'static str, usize>,
}

pub struct PageIndexer {
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn IndexStore>,
    chunk_config: ChunkConfig,
}

impl PageIndexer {
    pub fn new(embedder: Arc<dyn EmbeddingClient>, store: Arc<dyn IndexStore>) -> Self {
        Self {
            embedder,
            store,
            chunk_config: ChunkConfig::default(),
        }
    }

    /// Chunk, classify, embed and replace the chunks of one page.
    /// Dry runs report what would happen without embedding or writing.
    pub async fn index_page(&self, page: &Page, dry_run: bool) -> Result<IndexSummary, RagError> {
        let category = classify_url(&page.url);
        let pieces: Vec<String> = chunks(&page.content, self.chunk_config)
            .map(str::to_string)
            .collect();

        info!(
            title = %page.title,
            chunks = pieces.len(),
            category = %category,
            "indexing page"
        );

        if dry_run || pieces.is_empty() {
            return Ok(IndexSummary {
                chunks: pieces.len(),
                category,
            });
        }

        let batch = self.embedder.embed_batch(&pieces).await?;
        let rows: Vec<NewChunk> = pieces
            .into_iter()
            .zip(batch.vectors)
            .enumerate()
            .map(|(idx, (content, embedding))| NewChunk {
                tenant_id: page.tenant_id,
                page_id: page.id,
                chunk_index: idx as i32,
                content,
                embedding,
                category,
            })
            .collect();
        let count = rows.len();

        self.store
            .replace_chunks(page.tenant_id, page.id, rows)
            .await?;

        Ok(IndexSummary {
            chunks: count,
            category,
        })
    }

    /// Reindex every page of a tenant. Failures are counted, not fatal.
    pub async fn reindex_tenant(
        &self,
        tenant_id: Uuid,
        dry_run: bool,
    ) -> Result<ReindexStats, RagError> {
        let pages = self.store.list_pages(tenant_id).await?;
        let mut stats = ReindexStats {
            total: pages.len(),
            ..Default::default()
        };

        for page in &pages {
            match self.index_page(page, dry_run).await {
                Ok(summary) => {
                    stats.processed += 1;
                    *stats.per_category.entry(summary.category.label()).or_insert(0) += 1;
                }
                Err(e) => {
                    tracing::error!(title = %page.title, error = %e, "failed to index page");
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }
}
