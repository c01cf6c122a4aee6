use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use kommunsvar_core::ConversationTurn;
use kommunsvar_rag::{calculate_cost, hash_ip, Pricing};
use kommunsvar_store::QueryLogRow;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::models::{ApiError, SearchMetadata, SearchParams, SearchResponse};
use crate::state::AppState;

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ApiError>)> {
    let start = Instant::now();

    let q = params.q.trim().to_string();
    if q.is_empty() {
        return Err(ApiError::validation("Missing q"));
    }

    // A malformed history is not worth failing the query over.
    let history = decode_history(params.history.as_deref());
    info!(query = %q, turns = history.len(), "search request");

    let result = state
        .engine
        .answer(&q, &history)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let elapsed = start.elapsed();

    // Fire-and-forget usage record, after the answer exists.
    let cost = calculate_cost(&result.usage, &Pricing::default());
    state.logger.record(QueryLogRow {
        tenant_id: state.config.tenant_id,
        query_text: q,
        category: result.detected_category,
        response_text: result.answer.clone(),
        sources_count: result.sources.len() as u32,
        embedding_tokens: result.usage.embedding_tokens,
        completion_prompt_tokens: result.usage.prompt_tokens,
        completion_response_tokens: result.usage.completion_tokens,
        total_cost_usd: cost,
        response_time_ms: elapsed.as_millis() as u64,
        similarity_threshold: state.engine.config().similarity_threshold,
        chunks_found: result.chunks_found as u32,
        session_id: header_value(&headers, "x-session-id"),
        user_language: "sv".to_string(),
        user_agent: header_value(&headers, "user-agent"),
        ip_hash: client_ip(&headers).map(|ip| hash_ip(&ip, &state.config.ip_salt)),
        created_at: Utc::now(),
    });

    info!(
        sources = result.sources.len(),
        chunks = result.chunks_found,
        time_ms = elapsed.as_millis() as u64,
        "search complete"
    );

    Ok(Json(SearchResponse {
        answer: result.answer,
        sources: result.sources,
        metadata: SearchMetadata {
            detected_category: result.detected_category.map(|c| c.label()),
            chunks_found: result.chunks_found,
            response_time_ms: elapsed.as_millis(),
        },
    }))
}

fn decode_history(raw: Option<&str>) -> Vec<ConversationTurn> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(turns) => turns,
        Err(e) => {
            warn!(error = %e, "could not parse history, ignoring");
            Vec::new()
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Client IP, proxy-aware: x-real-ip first, then the first entry of
/// x-forwarded-for.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(ip) = header_value(headers, "x-real-ip") {
        return Some(ip);
    }
    header_value(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kommunsvar_core::TurnType;

    #[test]
    fn test_decode_history() {
        let turns = decode_history(Some(
            r#"[{"type":"question","text":"Vad kostar bygglov?"},{"type":"answer","text":"..."}]"#,
        ));
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].turn_type, TurnType::Question);
    }

    #[test]
    fn test_decode_history_tolerates_garbage() {
        assert!(decode_history(Some("not json")).is_empty());
        assert!(decode_history(Some("{}")).is_empty());
        assert!(decode_history(None).is_empty());
    }

    #[test]
    fn test_client_ip_prefers_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "198.51.100.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), Some("198.51.100.7".to_string()));

        headers.insert("x-real-ip", "203.0.113.9".parse().unwrap());
        assert_eq!(client_ip(&headers), Some("203.0.113.9".to_string()));
    }
}
