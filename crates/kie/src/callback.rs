//! Callback payload model and callback URL construction.
//!
//! Kie.ai delivers results as a webhook POST shaped like
//! `{code, msg, data: {taskId, info: {resultUrls: [..]}}}`. The result
//! list arrives under either `resultUrls` or `result_urls` depending on
//! the endpoint, and deliveries are at-least-once and unordered, so the
//! model is deliberately lenient: every field beyond `code` is optional.

use serde::Deserialize;

use cineforge_core::task::CorrelationMode;
use cineforge_core::types::TaskId;

use crate::SUCCESS_CODE;

/// Top-level webhook payload.
#[derive(Debug, Deserialize)]
pub struct CallbackEnvelope {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<CallbackData>,
}

/// `data` object of a callback payload.
#[derive(Debug, Deserialize)]
pub struct CallbackData {
    /// Provider-assigned job id, echoed back from submission.
    #[serde(rename = "taskId", default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub info: Option<CallbackInfo>,
}

/// `data.info` object carrying the result list.
#[derive(Debug, Deserialize)]
pub struct CallbackInfo {
    /// Result URLs under either known spelling of the field.
    #[serde(rename = "resultUrls", alias = "result_urls", default)]
    pub result_urls: Option<Vec<String>>,
}

impl CallbackEnvelope {
    /// Parse a raw request body.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Whether the provider reports the job as succeeded.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Provider-assigned job id inside the payload, if present.
    pub fn provider_task_id(&self) -> Option<&str> {
        self.data.as_ref()?.task_id.as_deref()
    }

    /// First entry of the result list, if the provider sent one.
    pub fn first_result_url(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .info
            .as_ref()?
            .result_urls
            .as_ref()?
            .first()
            .map(String::as_str)
    }

    /// Provider message, with a fallback for silent failures.
    pub fn message(&self) -> &str {
        self.msg.as_deref().unwrap_or("no message from provider")
    }
}

/// Build the callback URL handed to the provider at submission time.
///
/// Embedded mode encodes the internal task id as a query parameter the
/// provider echoes back verbatim; linked mode hands out the bare
/// endpoint and relies on the provider-assigned id inside the callback
/// body instead.
pub fn callback_url(public_base_url: &str, mode: CorrelationMode, task_id: TaskId) -> String {
    let base = format!(
        "{}/api/v1/callback",
        public_base_url.trim_end_matches('/')
    );
    match mode {
        CorrelationMode::Embedded => format!("{base}?task={task_id}"),
        CorrelationMode::Linked => base,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CallbackEnvelope {
        CallbackEnvelope::parse(json.as_bytes()).unwrap()
    }

    // -- payload parsing ------------------------------------------------------

    #[test]
    fn full_success_payload_parses() {
        let env = parse(
            r#"{"code": 200, "msg": "done",
                "data": {"taskId": "ext-123",
                         "info": {"resultUrls": ["https://x/video.mp4"]}}}"#,
        );
        assert!(env.is_success());
        assert_eq!(env.provider_task_id(), Some("ext-123"));
        assert_eq!(env.first_result_url(), Some("https://x/video.mp4"));
    }

    #[test]
    fn snake_case_result_field_is_accepted() {
        let env = parse(
            r#"{"code": 200,
                "data": {"taskId": "ext-1",
                         "info": {"result_urls": ["https://x/a.png", "https://x/b.png"]}}}"#,
        );
        assert_eq!(env.first_result_url(), Some("https://x/a.png"));
    }

    #[test]
    fn missing_result_list_yields_none() {
        let env = parse(r#"{"code": 200, "data": {"taskId": "ext-1"}}"#);
        assert_eq!(env.first_result_url(), None);

        let env = parse(r#"{"code": 200, "data": {"taskId": "ext-1", "info": {}}}"#);
        assert_eq!(env.first_result_url(), None);
    }

    #[test]
    fn empty_result_list_yields_none() {
        let env = parse(r#"{"code": 200, "data": {"taskId": "ext-1", "info": {"resultUrls": []}}}"#);
        assert_eq!(env.first_result_url(), None);
    }

    #[test]
    fn failure_payload_carries_message() {
        let env = parse(r#"{"code": 500, "msg": "generation failed"}"#);
        assert!(!env.is_success());
        assert_eq!(env.message(), "generation failed");
        assert_eq!(env.provider_task_id(), None);
    }

    #[test]
    fn message_falls_back_when_absent() {
        let env = parse(r#"{"code": 500}"#);
        assert_eq!(env.message(), "no message from provider");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(CallbackEnvelope::parse(b"not json").is_err());
        assert!(CallbackEnvelope::parse(b"").is_err());
    }

    // -- callback URL construction --------------------------------------------

    #[test]
    fn embedded_mode_appends_the_task_parameter() {
        let id: TaskId = "6ba7b810-9dad-11d1-80b4-00c04fd430c8".parse().unwrap();
        let url = callback_url("https://api.example.com", CorrelationMode::Embedded, id);
        assert_eq!(
            url,
            "https://api.example.com/api/v1/callback?task=6ba7b810-9dad-11d1-80b4-00c04fd430c8"
        );
    }

    #[test]
    fn linked_mode_hands_out_the_bare_endpoint() {
        let id: TaskId = "6ba7b810-9dad-11d1-80b4-00c04fd430c8".parse().unwrap();
        let url = callback_url("https://api.example.com/", CorrelationMode::Linked, id);
        assert_eq!(url, "https://api.example.com/api/v1/callback");
    }
}
