use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use kommunsvar_rag::{AnswerEngine, EngineConfig, OpenAiClient, QueryLogger};
use kommunsvar_store::SupabaseClient;

mod azure;
mod config;
mod handlers;
mod models;
mod state;

use azure::{AzureSpeech, AzureTranslator};
use config::AppConfig;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // logging setup
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    info!(tenant_id = %config.tenant_id, "configuration loaded");

    let store = SupabaseClient::new(&config.supabase_url, &config.supabase_service_key)?;
    let openai = Arc::new(OpenAiClient::new(&config.openai_api_key)?);

    let engine = AnswerEngine::new(
        EngineConfig::new(config.tenant_id),
        openai.clone(),
        openai,
        Arc::new(store.clone()),
    );
    let logger = QueryLogger::new(Arc::new(store.clone()));

    let translator = match &config.translator {
        Some(creds) => Some(AzureTranslator::new(&creds.key, &creds.region)?),
        None => None,
    };
    let speech = match &config.speech {
        Some(creds) => Some(AzureSpeech::new(&creds.key, &creds.region)?),
        None => None,
    };
    if translator.is_none() {
        info!("Azure translator credentials not set, /translate disabled");
    }
    if speech.is_none() {
        info!("Azure speech credentials not set, /tts disabled");
    }

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState {
        config,
        engine,
        logger,
        store,
        translator,
        speech,
    });

    // Widget is embedded on the municipal site, so CORS stays open
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(handlers::search))
        .route("/feedback", post(handlers::feedback))
        .route("/translate", post(handlers::translate))
        .route("/tts", post(handlers::tts))
        .route("/check-env", get(handlers::check_env))
        .layer(cors)
        .with_state(state);

    info!("Listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
