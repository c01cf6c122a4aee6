// Supabase client over the PostgREST API and the match_document_chunks
// RPC. The service-role key is sent on every request; rows are scoped by
// tenant in each filter.

use crate::rows::{ChunkMatch, MatchRequest, NewChunk, NewPage, Page, PageMeta, QueryLogRow};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CHUNK_INSERT_BATCH: usize = 200;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Supabase returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::Api { status, body })
        }
    }

    /// Similarity search, delegated entirely to the datastore. Returns an
    /// empty Vec (not an error) when nothing clears the threshold.
    pub async fn match_chunks(&self, request: &MatchRequest) -> Result<Vec<ChunkMatch>, StoreError> {
        let response = self
            .authed(self.client.post(self.rpc_url("match_document_chunks")))
            .json(request)
            .send()
            .await?;
        let matches: Vec<ChunkMatch> = Self::check(response).await?.json().await?;
        debug!(
            matches = matches.len(),
            category = ?request.category,
            "similarity search complete"
        );
        Ok(matches)
    }

    /// Fetch url/title for the given page ids (for the sources list).
    pub async fn pages_by_ids(
        &self,
        tenant_id: Uuid,
        ids: &[i64],
    ) -> Result<Vec<PageMeta>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let response = self
            .authed(self.client.get(self.table_url("pages")))
            .query(&[
                ("select", "id,url,title".to_string()),
                ("tenant_id", format!("eq.{tenant_id}")),
                ("id", format!("in.({id_list})")),
            ])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Content hash of an already-ingested page, if any.
    pub async fn page_hash(&self, tenant_id: Uuid, url: &str) -> Result<Option<String>, StoreError> {
        #[derive(Deserialize)]
        struct HashRow {
            hash: String,
        }

        let response = self
            .authed(self.client.get(self.table_url("pages")))
            .query(&[
                ("select", "hash".to_string()),
                ("tenant_id", format!("eq.{tenant_id}")),
                ("url", format!("eq.{url}")),
            ])
            .send()
            .await?;
        let rows: Vec<HashRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next().map(|r| r.hash))
    }

    /// Insert or update a page, keyed on (tenant_id, url).
    pub async fn upsert_page(&self, page: &NewPage) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.post(self.table_url("pages")))
            .query(&[("on_conflict", "tenant_id,url")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[page])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// All pages of a tenant, in id order (for reindexing).
    pub async fn list_pages(&self, tenant_id: Uuid) -> Result<Vec<Page>, StoreError> {
        let response = self
            .authed(self.client.get(self.table_url("pages")))
            .query(&[
                ("select", "id,tenant_id,url,title,content,hash".to_string()),
                ("tenant_id", format!("eq.{tenant_id}")),
                ("order", "id.asc".to_string()),
            ])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Replace every chunk of a page: delete, then batch-insert. There is
    /// no incremental update; re-embedding is wholesale per page.
    pub async fn replace_chunks(
        &self,
        tenant_id: Uuid,
        page_id: i64,
        chunks: &[NewChunk],
    ) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.delete(self.table_url("document_chunks")))
            .query(&[
                ("tenant_id", format!("eq.{tenant_id}")),
                ("page_id", format!("eq.{page_id}")),
            ])
            .send()
            .await?;
        Self::check(response).await?;

        for batch in chunks.chunks(CHUNK_INSERT_BATCH) {
            let response = self
                .authed(self.client.post(self.table_url("document_chunks")))
                .header("Prefer", "return=minimal")
                .json(batch)
                .send()
                .await?;
            Self::check(response).await?;
        }
        debug!(page_id, chunks = chunks.len(), "chunks replaced");
        Ok(())
    }

    /// Persist one usage record and return its row id.
    pub async fn insert_query_log(&self, row: &QueryLogRow) -> Result<i64, StoreError> {
        #[derive(Deserialize)]
        struct Inserted {
            id: i64,
        }

        let response = self
            .authed(self.client.post(self.table_url("query_logs")))
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let rows: Vec<Inserted> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    /// Attach user feedback (+1/-1) to a logged query.
    pub async fn set_feedback(&self, query_id: i64, feedback: i32) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.patch(self.table_url("query_logs")))
            .query(&[("id", format!("eq.{query_id}"))])
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "user_feedback": feedback }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let store = SupabaseClient::new("https://example.supabase.co/", "key").unwrap();
        assert_eq!(
            store.table_url("pages"),
            "https://example.supabase.co/rest/v1/pages"
        );
        assert_eq!(
            store.rpc_url("match_document_chunks"),
            "https://example.supabase.co/rest/v1/rpc/match_document_chunks"
        );
    }
}
