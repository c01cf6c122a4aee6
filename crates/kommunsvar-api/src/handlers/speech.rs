use axum::{extract::State, http::StatusCode, Json};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use tracing::info;

use crate::models::{ApiError, TtsRequest, TtsResponse};
use crate::state::AppState;

pub async fn tts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TtsRequest>,
) -> Result<Json<TtsResponse>, (StatusCode, Json<ApiError>)> {
    let text = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Missing text"))?;

    let speech = state.speech.as_ref().ok_or_else(|| {
        ApiError::configuration(
            "Speech service is not configured",
            "Set AZURE_SPEECH_KEY and AZURE_SPEECH_REGION",
        )
    })?;

    let audio = speech
        .synthesize(text, &request.language)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(
        language = %request.language,
        bytes = audio.len(),
        "speech synthesized"
    );

    Ok(Json(TtsResponse {
        audio: STANDARD.encode(audio),
        format: "mp3",
    }))
}
