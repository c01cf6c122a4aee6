use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

use crate::models::{ApiError, TranslateRequest, TranslateResponse};
use crate::state::AppState;

pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, (StatusCode, Json<ApiError>)> {
    let text = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Missing text"))?;

    let translator = state.translator.as_ref().ok_or_else(|| {
        ApiError::configuration(
            "Translation service is not configured",
            "Set AZURE_TRANSLATOR_KEY and AZURE_TRANSLATOR_REGION",
        )
    })?;

    let translated = translator
        .translate(text, &request.target_lang)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(
        target_lang = %request.target_lang,
        chars = text.chars().count(),
        "translation served"
    );

    Ok(Json(TranslateResponse {
        original_text: text.to_string(),
        translated_text: translated,
        target_lang: request.target_lang,
    }))
}
