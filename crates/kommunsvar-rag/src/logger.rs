// Query logging: best-effort, fire-and-forget usage records with
// approximate cost accounting. A failed log attempt is traced and
// dropped; it must never affect the user-facing response.

use crate::engine::TokenUsage;
use async_trait::async_trait;
use kommunsvar_store::{QueryLogRow, StoreError, SupabaseClient};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};

/// OpenAI unit prices, USD per 1M tokens. Update when pricing changes.
#[derive(Debug, Clone, Copy)]
pub struct Pricing {
    pub embedding_per_1m: f64,
    pub chat_input_per_1m: f64,
    pub chat_output_per_1m: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            embedding_per_1m: 0.13,
            chat_input_per_1m: 0.15,
            chat_output_per_1m: 0.60,
        }
    }
}

/// Approximate cost of one answered query.
pub fn calculate_cost(usage: &TokenUsage, pricing: &Pricing) -> f64 {
    let embedding = usage.embedding_tokens as f64 / 1_000_000.0 * pricing.embedding_per_1m;
    let input = usage.prompt_tokens as f64 / 1_000_000.0 * pricing.chat_input_per_1m;
    let output = usage.completion_tokens as f64 / 1_000_000.0 * pricing.chat_output_per_1m;
    embedding + input + output
}

/// One-way salted hash of a caller IP. Raw addresses are never stored.
pub fn hash_ip(ip: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
pub trait QueryLogSink: Send + Sync {
    async fn insert_query_log(&self, row: &QueryLogRow) -> Result<i64, StoreError>;
}

#[async_trait]
impl QueryLogSink for SupabaseClient {
    async fn insert_query_log(&self, row: &QueryLogRow) -> Result<i64, StoreError> {
        SupabaseClient::insert_query_log(self, row).await
    }
}

pub struct QueryLogger {
    sink: Arc<dyn QueryLogSink>,
}

impl QueryLogger {
    pub fn new(sink: Arc<dyn QueryLogSink>) -> Self {
        Self { sink }
    }

    /// Dispatch the record on a detached task after the response has been
    /// prepared. Errors are traced and dropped.
    pub fn record(&self, row: QueryLogRow) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            match sink.insert_query_log(&row).await {
                Ok(id) => info!(
                    query_id = id,
                    cost_usd = row.total_cost_usd,
                    "query logged"
                ),
                Err(e) => warn!(error = %e, "failed to log query"),
            }
        });
    }
}
