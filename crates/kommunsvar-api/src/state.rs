use crate::azure::{AzureSpeech, AzureTranslator};
use crate::config::AppConfig;
use kommunsvar_rag::{AnswerEngine, QueryLogger};
use kommunsvar_store::SupabaseClient;

pub struct AppState {
    pub config: AppConfig,
    pub engine: AnswerEngine,
    pub logger: QueryLogger,
    pub store: SupabaseClient,
    pub translator: Option<AzureTranslator>,
    pub speech: Option<AzureSpeech>,
}
