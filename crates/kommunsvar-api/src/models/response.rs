use axum::{http::StatusCode, Json};
use kommunsvar_rag::Source;
use serde::Serialize;

/// JSON error body. Validation errors are recovered at the boundary
/// (400); upstream and configuration failures surface as 500, the
/// latter with a details hint naming the missing credential.
#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                error: message.into(),
                code: status.as_u16(),
                details: None,
            }),
        )
    }

    pub fn validation(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn configuration(
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                error: message.into(),
                code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                details: Some(details.into()),
            }),
        )
    }
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    pub metadata: SearchMetadata,
}

#[derive(Serialize)]
pub struct SearchMetadata {
    pub detected_category: Option<&'static str>,
    pub chunks_found: usize,
    pub response_time_ms: u128,
}

#[derive(Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub query_id: i64,
    pub feedback: i32,
}

#[derive(Serialize)]
pub struct TranslateResponse {
    #[serde(rename = "originalText")]
    pub original_text: String,
    #[serde(rename = "translatedText")]
    pub translated_text: String,
    #[serde(rename = "targetLang")]
    pub target_lang: String,
}

#[derive(Serialize)]
pub struct TtsResponse {
    pub audio: String,
    pub format: &'static str,
}

/// Presence booleans only; never the values.
#[derive(Serialize)]
pub struct CheckEnvResponse {
    pub has_supabase: bool,
    pub has_openai: bool,
    pub has_azure_translator: bool,
    pub has_azure_speech: bool,
    pub tenant_id: String,
}
