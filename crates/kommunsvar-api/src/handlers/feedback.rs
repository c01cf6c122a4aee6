use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

use crate::models::{ApiError, FeedbackResponse};
use crate::state::AppState;

pub async fn feedback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<FeedbackResponse>, (StatusCode, Json<ApiError>)> {
    let (query_id, value) = parse_feedback(&body).map_err(ApiError::validation)?;

    state
        .store
        .set_feedback(query_id, value)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(query_id, feedback = value, "feedback recorded");
    Ok(Json(FeedbackResponse {
        success: true,
        query_id,
        feedback: value,
    }))
}

/// Manual validation so malformed bodies map to 400, not an extractor
/// rejection: query_id must be a number, feedback exactly 1 or -1.
fn parse_feedback(body: &serde_json::Value) -> Result<(i64, i32), &'static str> {
    let query_id = body
        .get("query_id")
        .and_then(|v| v.as_i64())
        .ok_or("Missing or invalid query_id")?;

    let value = body
        .get("feedback")
        .and_then(|v| v.as_i64())
        .filter(|v| *v == 1 || *v == -1)
        .ok_or("Feedback must be 1 (positive) or -1 (negative)")?;

    Ok((query_id, value as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_feedback() {
        assert_eq!(parse_feedback(&json!({"query_id": 42, "feedback": 1})), Ok((42, 1)));
        assert_eq!(parse_feedback(&json!({"query_id": 7, "feedback": -1})), Ok((7, -1)));
    }

    #[test]
    fn test_zero_feedback_rejected() {
        assert!(parse_feedback(&json!({"query_id": 42, "feedback": 0})).is_err());
    }

    #[test]
    fn test_missing_or_non_numeric_query_id() {
        assert!(parse_feedback(&json!({"feedback": 1})).is_err());
        assert!(parse_feedback(&json!({"query_id": "42", "feedback": 1})).is_err());
    }

    #[test]
    fn test_out_of_range_feedback() {
        assert!(parse_feedback(&json!({"query_id": 1, "feedback": 2})).is_err());
        assert!(parse_feedback(&json!({"query_id": 1, "feedback": "1"})).is_err());
    }
}
