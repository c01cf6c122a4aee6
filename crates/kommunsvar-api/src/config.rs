// Environment configuration, validated eagerly at startup so missing
// credentials fail fast instead of deep inside a call chain. The Azure
// pairs are optional; their absence is reported per-request by the
// translate/tts handlers instead.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Credentials for one Azure Cognitive Services resource.
#[derive(Debug, Clone)]
pub struct AzureCredentials {
    pub key: String,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub openai_api_key: String,
    pub tenant_id: Uuid,
    pub ip_salt: String,
    pub translator: Option<AzureCredentials>,
    pub speech: Option<AzureCredentials>,
    pub bind_addr: String,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional_pair(key_name: &str, region_name: &str) -> Option<AzureCredentials> {
    let key = std::env::var(key_name).ok().filter(|v| !v.is_empty())?;
    let region = std::env::var(region_name).ok().filter(|v| !v.is_empty())?;
    Some(AzureCredentials { key, region })
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let tenant_raw = required("TENANT_ID")?;
        let tenant_id = Uuid::parse_str(&tenant_raw).map_err(|e| ConfigError::Invalid {
            name: "TENANT_ID",
            reason: e.to_string(),
        })?;

        Ok(Self {
            supabase_url: required("SUPABASE_URL")?,
            supabase_service_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            tenant_id,
            ip_salt: std::env::var("IP_SALT").unwrap_or_else(|_| "default-salt".to_string()),
            translator: optional_pair("AZURE_TRANSLATOR_KEY", "AZURE_TRANSLATOR_REGION"),
            speech: optional_pair("AZURE_SPEECH_KEY", "AZURE_SPEECH_REGION"),
            bind_addr: std::env::var("KOMMUNSVAR_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_is_named() {
        // deliberately unset name
        std::env::remove_var("KOMMUNSVAR_TEST_NOT_SET");
        let err = required("KOMMUNSVAR_TEST_NOT_SET").unwrap_err();
        assert!(err.to_string().contains("KOMMUNSVAR_TEST_NOT_SET"));
    }

    #[test]
    fn test_optional_pair_needs_both() {
        std::env::set_var("KOMMUNSVAR_TEST_AZ_KEY", "k");
        std::env::remove_var("KOMMUNSVAR_TEST_AZ_REGION");
        assert!(optional_pair("KOMMUNSVAR_TEST_AZ_KEY", "KOMMUNSVAR_TEST_AZ_REGION").is_none());

        std::env::set_var("KOMMUNSVAR_TEST_AZ_REGION", "swedencentral");
        assert!(optional_pair("KOMMUNSVAR_TEST_AZ_KEY", "KOMMUNSVAR_TEST_AZ_REGION").is_some());
    }
}
