use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::CheckEnvResponse;
use crate::state::AppState;

/// Deployment sanity check. Reports which credentials are present
/// without ever echoing their values.
pub async fn check_env(State(state): State<Arc<AppState>>) -> Json<CheckEnvResponse> {
    let config = &state.config;
    Json(CheckEnvResponse {
        has_supabase: !config.supabase_url.is_empty() && !config.supabase_service_key.is_empty(),
        has_openai: !config.openai_api_key.is_empty(),
        has_azure_translator: config.translator.is_some(),
        has_azure_speech: config.speech.is_some(),
        tenant_id: config.tenant_id.to_string(),
    })
}
