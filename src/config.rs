use std::env;

use anyhow::{anyhow, Result};
use secrecy::SecretString;

/// Default base URL of the completion provider's API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Fallback credential used when `OPENAI_API_KEY` is unset.  The service
/// must boot without a key so liveness checks keep passing; the provider
/// rejects the placeholder on first use, surfacing an auth error then.
pub const PLACEHOLDER_API_KEY: &str = "default_key";

const DEFAULT_COMPLETION_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Credential for the completion provider.
    pub api_key: SecretString,
    /// Base URL of the provider API; overridable so tests can point at a stub.
    pub base_url: String,
    /// Timeout applied to each outbound completion call.
    pub completion_timeout_ms: u64,
    /// Maximum accepted raw request body size in bytes (None => axum default).
    pub max_request_bytes: Option<usize>,
}

impl AppConfig {
    /// Read configuration from the environment:
    ///
    /// * `OPENAI_API_KEY` (optional) – provider credential; placeholder if unset.
    /// * `OPENAI_BASE_URL` (optional) – provider API base URL.
    /// * `CANDOR_COMPLETION_TIMEOUT_MS` (optional) – outbound call timeout.
    /// * `CANDOR_MAX_REQUEST_BYTES` (optional) – request body cap.
    pub fn from_env() -> Result<Self> {
        let api_key = match env::var("OPENAI_API_KEY") {
            Ok(value) if !value.trim().is_empty() => value,
            _ => {
                tracing::warn!(
                    "OPENAI_API_KEY not set; completion calls will fail with an auth error"
                );
                PLACEHOLDER_API_KEY.to_string()
            }
        };

        let base_url = env::var("OPENAI_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let completion_timeout_ms = parse_optional_u64("CANDOR_COMPLETION_TIMEOUT_MS")?
            .unwrap_or(DEFAULT_COMPLETION_TIMEOUT_MS);
        let max_request_bytes =
            parse_optional_u64("CANDOR_MAX_REQUEST_BYTES")?.map(|v| v as usize);

        Ok(Self {
            api_key: SecretString::new(api_key),
            base_url,
            completion_timeout_ms,
            max_request_bytes,
        })
    }
}

fn parse_optional_u64(var: &str) -> Result<Option<u64>> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| anyhow!("{} must be a positive integer", var)),
        Ok(_) => Ok(None),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
