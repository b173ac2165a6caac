use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};

use crate::config::BackendConfig;
use crate::errors::{BackendError, PipelineError};
use crate::types::GenerationRequest;

/// Boundary to a code-generation service. The pipeline only ever sees this
/// trait, so tests drive it with in-process fakes.
#[async_trait::async_trait]
pub trait CodeBackend: Send + Sync {
    /// Returns the generated source text for `request`, or a classified
    /// failure. Callers never see raw transport errors.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;

    fn name(&self) -> &str;
}

/// HTTP client for the remote generation service: POST `{url}/generate` with
/// a JSON `{prompt, language}` body, bearer credential attached only when one
/// is configured.
pub struct RemoteBackend {
    client: Client,
    endpoint: String,
    secret: Option<String>,
}

impl RemoteBackend {
    /// Generation is slow, so the request timeout is minutes rather than the
    /// seconds an interactive API call would get.
    pub fn new(config: &BackendConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(format!("backend HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/generate", config.url.trim_end_matches('/')),
            secret: config.secret.clone(),
        })
    }
}

#[async_trait::async_trait]
impl CodeBackend for RemoteBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let body = json!({
            "prompt": request.task,
            "language": request.language,
        });

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(secret) = &self.secret {
            req = req.bearer_auth(secret);
        }
        let res = req.send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await?;
            return Err(BackendError::Api { status, body });
        }

        let response_json: Value = res.json().await?;
        let code = response_json
            .get("code")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                BackendError::InvalidResponse("missing 'code' field in response".to_string())
            })?;

        if code.is_empty() {
            return Err(BackendError::EmptyCode);
        }

        Ok(code.to_string())
    }

    fn name(&self) -> &str {
        "remote"
    }
}
