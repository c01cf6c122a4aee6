use serde::Deserialize;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// URL-encoded JSON array of conversation turns.
    pub history: Option<String>,
}

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: Option<String>,
    #[serde(rename = "targetLang", default = "default_target_lang")]
    pub target_lang: String,
}

fn default_target_lang() -> String {
    "en".to_string()
}

#[derive(Deserialize)]
pub struct TtsRequest {
    pub text: Option<String>,
    #[serde(default = "default_tts_language")]
    pub language: String,
}

fn default_tts_language() -> String {
    "sv".to_string()
}
