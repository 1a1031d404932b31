//! REST client for the Kie.ai generation endpoints.
//!
//! Wraps job submission for the veo3 video model and the gpt4o image
//! model using [`reqwest`]. All connection settings come in through
//! [`KieConfig`]; nothing is read from ambient state.

use std::time::Duration;

use serde::Deserialize;

use crate::SUCCESS_CODE;

/// Submission endpoint for veo3 video generation.
const VIDEO_PATH: &str = "/api/v1/veo/generate";

/// Submission endpoint for gpt4o image generation.
const IMAGE_PATH: &str = "/api/v1/gpt4o-image/generate";

/// Connection settings for the Kie.ai API.
#[derive(Debug, Clone)]
pub struct KieConfig {
    /// Base HTTP URL, e.g. `https://api.kie.ai`.
    pub base_url: String,
    /// Bearer token sent in the `Authorization` header.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// HTTP client for the Kie.ai API.
pub struct KieClient {
    client: reqwest::Client,
    config: KieConfig,
}

/// Response body returned by the generation endpoints at submission
/// time: `{code, msg, data: {taskId}}`.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<SubmitData>,
}

/// Payload of a successful submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitData {
    /// Provider-assigned job id, used to match the eventual callback.
    #[serde(rename = "taskId", default)]
    pub task_id: Option<String>,
}

/// Errors from the Kie.ai REST layer.
#[derive(Debug, thiserror::Error)]
pub enum KieError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Kie.ai returned a non-2xx status code.
    #[error("Kie API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },

    /// Kie.ai answered 2xx but reported a non-success `code`.
    #[error("Kie rejected the job (code {code}): {msg}")]
    Rejected { code: i64, msg: String },
}

impl KieClient {
    /// Create a new client from explicit configuration.
    pub fn new(config: KieConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Submit a veo3 video generation job.
    ///
    /// `callback_url` is where the provider will POST the result; it may
    /// carry the internal task id as a query parameter depending on the
    /// correlation strategy. Returns the provider-assigned job id when
    /// the provider reports one.
    pub async fn generate_video(
        &self,
        prompt: &str,
        callback_url: &str,
    ) -> Result<Option<String>, KieError> {
        let body = serde_json::json!({
            "prompt": prompt,
            "model": "veo3",
            "aspectRatio": "16:9",
            "callBackUrl": callback_url,
        });
        self.submit(VIDEO_PATH, &body).await
    }

    /// Submit a gpt4o image generation job.
    pub async fn generate_image(
        &self,
        prompt: &str,
        callback_url: &str,
    ) -> Result<Option<String>, KieError> {
        let body = serde_json::json!({
            "prompt": prompt,
            "filesUrl": [],
            "size": "1:1",
            "callBackUrl": callback_url,
        });
        self.submit(IMAGE_PATH, &body).await
    }

    // ---- private helpers ----

    /// POST a submission payload and extract the provider task id.
    async fn submit(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<Option<String>, KieError> {
        let response = self
            .client
            .post(format!("{}{}", self.config.base_url, path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let parsed: SubmitResponse = Self::parse_response(response).await?;

        tracing::debug!(path, code = parsed.code, "Kie submission response received");

        if parsed.code != SUCCESS_CODE {
            return Err(KieError::Rejected {
                code: parsed.code,
                msg: parsed
                    .msg
                    .unwrap_or_else(|| "no message from provider".to_string()),
            });
        }

        Ok(parsed.data.and_then(|d| d.task_id))
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`KieError::Api`] containing
    /// the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, KieError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(KieError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, KieError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_response_parses_with_task_id() {
        let json = r#"{"code": 200, "msg": "success", "data": {"taskId": "ext-123"}}"#;
        let parsed: SubmitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.code, 200);
        assert_eq!(parsed.data.unwrap().task_id.as_deref(), Some("ext-123"));
    }

    #[test]
    fn submit_response_tolerates_missing_fields() {
        let parsed: SubmitResponse = serde_json::from_str(r#"{"code": 500}"#).unwrap();
        assert_eq!(parsed.code, 500);
        assert!(parsed.msg.is_none());
        assert!(parsed.data.is_none());

        let parsed: SubmitResponse = serde_json::from_str(r#"{"code": 200, "data": {}}"#).unwrap();
        assert!(parsed.data.unwrap().task_id.is_none());
    }
}
