// Row and request shapes for the pages / document_chunks / query_logs
// tables and the match_document_chunks RPC.

use chrono::{DateTime, Utc};
use kommunsvar_core::Category;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Arguments for the `match_document_chunks` similarity-search procedure.
/// `category: None` means unrestricted (the RPC receives SQL NULL).
#[derive(Debug, Clone, Serialize)]
pub struct MatchRequest {
    pub tenant_id: Uuid,
    pub query_embedding: Vec<f32>,
    #[serde(rename = "filter_category")]
    pub category: Option<Category>,
    pub similarity_threshold: f32,
    pub match_count: u32,
}

/// One ranked match from the vector search, ordered by descending
/// similarity on the server side.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkMatch {
    pub id: i64,
    pub page_id: i64,
    pub content: String,
    pub similarity: f32,
    #[serde(default)]
    pub category: Option<Category>,
}

/// Source metadata looked up per distinct page_id of the matches.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub id: i64,
    pub url: String,
    pub title: String,
}

/// A full page row, as read back for reindexing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: i64,
    pub tenant_id: Uuid,
    pub url: String,
    pub title: String,
    pub content: String,
    pub hash: String,
}

/// Upsert payload for the ingestion pipeline, keyed on (tenant_id, url).
#[derive(Debug, Clone, Serialize)]
pub struct NewPage {
    pub tenant_id: Uuid,
    pub url: String,
    pub title: String,
    pub content: String,
    pub hash: String,
}

/// Chunk insert payload. Embeddings are fixed-length (1536) vectors;
/// category is denormalized from the page URL at creation time.
#[derive(Debug, Clone, Serialize)]
pub struct NewChunk {
    pub tenant_id: Uuid,
    pub page_id: i64,
    pub chunk_index: i32,
    pub content: String,
    pub embedding: Vec<f32>,
    pub category: Category,
}

/// Usage record for one answered query. Append-only apart from
/// `user_feedback`, which is attached later.
#[derive(Debug, Clone, Serialize)]
pub struct QueryLogRow {
    pub tenant_id: Uuid,
    pub query_text: String,
    pub category: Option<Category>,
    pub response_text: String,
    pub sources_count: u32,

    pub embedding_tokens: u32,
    pub completion_prompt_tokens: u32,
    pub completion_response_tokens: u32,
    pub total_cost_usd: f64,

    pub response_time_ms: u64,
    pub similarity_threshold: f32,
    pub chunks_found: u32,

    pub session_id: Option<String>,
    pub user_language: String,
    pub user_agent: Option<String>,
    pub ip_hash: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_request_null_category() {
        let req = MatchRequest {
            tenant_id: Uuid::nil(),
            query_embedding: vec![0.0; 3],
            category: None,
            similarity_threshold: 0.35,
            match_count: 5,
        };
        let body = serde_json::to_value(&req).unwrap();
        assert!(body["filter_category"].is_null());
        assert_eq!(body["match_count"], 5);
    }

    #[test]
    fn test_match_request_category_label() {
        let req = MatchRequest {
            tenant_id: Uuid::nil(),
            query_embedding: vec![],
            category: Some(Category::ByggaBoMiljo),
            similarity_threshold: 0.35,
            match_count: 5,
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["filter_category"], "Bygga, bo och miljö");
    }

    #[test]
    fn test_chunk_match_decoding() {
        let row: ChunkMatch = serde_json::from_str(
            r#"{"id":7,"page_id":3,"content":"Bygglov krävs...","similarity":0.82,"category":"Bygga, bo och miljö"}"#,
        )
        .unwrap();
        assert_eq!(row.category, Some(Category::ByggaBoMiljo));

        // category column may be NULL for old rows
        let row: ChunkMatch = serde_json::from_str(
            r#"{"id":8,"page_id":3,"content":"...","similarity":0.5,"category":null}"#,
        )
        .unwrap();
        assert_eq!(row.category, None);
    }
}
