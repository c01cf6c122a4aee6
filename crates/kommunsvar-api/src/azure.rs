// Azure Cognitive Services clients: Translator (text) and Speech (TTS).
// Both are stateless per-request REST calls with bounded timeouts.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Azure API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

// TRANSLATOR //

#[derive(Debug, Clone)]
pub struct AzureTranslator {
    client: Client,
    key: String,
    region: String,
}

#[derive(Serialize)]
struct TranslateItem<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TranslateResult {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
}

impl AzureTranslator {
    const ENDPOINT: &'static str = "https://api.cognitive.microsofttranslator.com/translate";

    pub fn new(key: impl Into<String>, region: impl Into<String>) -> Result<Self, AzureError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            key: key.into(),
            region: region.into(),
        })
    }

    pub async fn translate(&self, text: &str, target_lang: &str) -> Result<String, AzureError> {
        let response = self
            .client
            .post(Self::ENDPOINT)
            .query(&[("api-version", "3.0"), ("to", target_lang)])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .json(&[TranslateItem { text }])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AzureError::ApiError { status, body });
        }

        let results: Vec<TranslateResult> = response.json().await?;
        Ok(results
            .into_iter()
            .next()
            .and_then(|r| r.translations.into_iter().next())
            .map(|t| t.text)
            // Azure returned nothing usable; fall back to the input
            .unwrap_or_else(|| text.to_string()))
    }
}

// SPEECH //

#[derive(Debug, Clone)]
pub struct AzureSpeech {
    client: Client,
    key: String,
    region: String,
}

impl AzureSpeech {
    const OUTPUT_FORMAT: &'static str = "audio-16khz-32kbitrate-mono-mp3";

    pub fn new(key: impl Into<String>, region: impl Into<String>) -> Result<Self, AzureError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            key: key.into(),
            region: region.into(),
        })
    }

    /// Synthesize `text` to MP3 bytes. Swedish is the default voice;
    /// "en" selects the British English one.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, AzureError> {
        let (voice, xml_lang) = voice_for(language);
        let ssml = format!(
            "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{xml_lang}'><voice name='{voice}'>{}</voice></speak>",
            escape_xml(text)
        );

        let url = format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.region
        );
        let response = self
            .client
            .post(url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", Self::OUTPUT_FORMAT)
            .header("User-Agent", "kommunsvar-tts")
            .body(ssml)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AzureError::ApiError { status, body });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn voice_for(language: &str) -> (&'static str, &'static str) {
    if language == "en" {
        ("en-GB-LibbyNeural", "en-GB")
    } else {
        ("sv-SE-SofieNeural", "sv-SE")
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_escaping() {
        assert_eq!(
            escape_xml(r#"5 < 7 & "citat" på 'svenska'"#),
            "5 &lt; 7 &amp; &quot;citat&quot; på &apos;svenska&apos;"
        );
        assert_eq!(escape_xml("inget att ändra åäö"), "inget att ändra åäö");
    }

    #[test]
    fn test_voice_selection() {
        assert_eq!(voice_for("en"), ("en-GB-LibbyNeural", "en-GB"));
        assert_eq!(voice_for("sv"), ("sv-SE-SofieNeural", "sv-SE"));
        // anything unknown falls back to Swedish
        assert_eq!(voice_for("de"), ("sv-SE-SofieNeural", "sv-SE"));
    }
}
