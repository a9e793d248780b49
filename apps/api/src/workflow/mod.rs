//! Workflow client — the single point of entry for all AI workflow calls.
//!
//! ARCHITECTURAL RULE: no other module may call the workflow engine directly.
//! Every generation goes through `WorkflowClient`, and every handler consumes
//! it as `Arc<dyn WorkflowClient>` so tests can substitute a scripted one.
//!
//! Failures do not retry: a generation failure is surfaced to the caller,
//! who owns the user-facing "Regenerate" action.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Workflow API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected workflow output shape: {0}")]
    Shape(String),
}

/// Structured inputs sent to a workflow run. BTreeMap keeps the payload
/// deterministic for a given profile state.
pub type Inputs = BTreeMap<String, String>;

/// The `outputs` map of a completed workflow run, with typed extraction.
#[derive(Debug, Clone, Default)]
pub struct Outputs(pub Map<String, Value>);

impl Outputs {
    /// Extracts and deserializes `key`. A missing key or a value of the wrong
    /// shape is a generation failure, never a partial success.
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T, WorkflowError> {
        let value = self
            .0
            .get(key)
            .cloned()
            .ok_or_else(|| WorkflowError::Shape(format!("output '{key}' is missing")))?;
        serde_json::from_value(value)
            .map_err(|e| WorkflowError::Shape(format!("output '{key}': {e}")))
    }

    /// Extracts `key` as a string containing JSON and deserializes that.
    /// Some workflows return their payload double-encoded this way.
    pub fn require_embedded<T: DeserializeOwned>(&self, key: &str) -> Result<T, WorkflowError> {
        let raw: String = self.require(key)?;
        serde_json::from_str(&raw)
            .map_err(|e| WorkflowError::Shape(format!("output '{key}' embedded JSON: {e}")))
    }
}

/// Reply from the chat collaborator. `conversation_id` is the continuation
/// token for the next message in the same session.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub conversation_id: String,
}

#[async_trait]
pub trait WorkflowClient: Send + Sync {
    /// Runs a blocking workflow with the given per-artifact credential and
    /// returns its outputs map.
    async fn run_workflow(
        &self,
        key: &str,
        inputs: Inputs,
        user: &str,
    ) -> Result<Outputs, WorkflowError>;

    /// Sends one chat message, optionally continuing an existing conversation.
    async fn chat(
        &self,
        key: &str,
        inputs: Inputs,
        query: &str,
        conversation_id: Option<&str>,
        user: &str,
    ) -> Result<ChatReply, WorkflowError>;
}

#[derive(Debug, Serialize)]
struct WorkflowRequest<'a> {
    inputs: &'a Inputs,
    response_mode: &'a str,
    user: &'a str,
}

#[derive(Debug, Deserialize)]
struct WorkflowResponse {
    data: WorkflowRunData,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunData {
    #[serde(default)]
    outputs: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    inputs: &'a Inputs,
    query: &'a str,
    response_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
    user: &'a str,
}

/// HTTP implementation against a Dify-style workflow engine.
#[derive(Clone)]
pub struct DifyClient {
    client: Client,
    workflow_url: String,
    chatflow_url: String,
}

impl DifyClient {
    pub fn new(workflow_url: String, chatflow_url: String) -> Self {
        DifyClient {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            workflow_url,
            chatflow_url,
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        key: &str,
        body: &impl Serialize,
    ) -> Result<T, WorkflowError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WorkflowError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = response.json().await?;
        serde_json::from_value(value)
            .map_err(|e| WorkflowError::Shape(format!("malformed workflow response body: {e}")))
    }
}

#[async_trait]
impl WorkflowClient for DifyClient {
    async fn run_workflow(
        &self,
        key: &str,
        inputs: Inputs,
        user: &str,
    ) -> Result<Outputs, WorkflowError> {
        let request = WorkflowRequest {
            inputs: &inputs,
            response_mode: "blocking",
            user,
        };
        let response: WorkflowResponse =
            self.post_json(&self.workflow_url, key, &request).await?;

        debug!(
            "Workflow run succeeded: {} output key(s)",
            response.data.outputs.len()
        );
        Ok(Outputs(response.data.outputs))
    }

    async fn chat(
        &self,
        key: &str,
        inputs: Inputs,
        query: &str,
        conversation_id: Option<&str>,
        user: &str,
    ) -> Result<ChatReply, WorkflowError> {
        let request = ChatRequest {
            inputs: &inputs,
            query,
            response_mode: "blocking",
            conversation_id,
            user,
        };
        self.post_json(&self.chatflow_url, key, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outputs(value: Value) -> Outputs {
        match value {
            Value::Object(map) => Outputs(map),
            _ => panic!("outputs must be an object"),
        }
    }

    #[test]
    fn test_require_typed_array() {
        let out = outputs(json!({"strengths": ["leadership", "writing"]}));
        let strengths: Vec<String> = out.require("strengths").unwrap();
        assert_eq!(strengths, vec!["leadership", "writing"]);
    }

    #[test]
    fn test_require_missing_key_is_shape_error() {
        let out = outputs(json!({}));
        let err = out.require::<Vec<String>>("strengths").unwrap_err();
        assert!(matches!(err, WorkflowError::Shape(_)));
    }

    #[test]
    fn test_require_wrong_shape_is_shape_error() {
        // Scalar where an array is expected must fail, not coerce.
        let out = outputs(json!({"strengths": "leadership"}));
        let err = out.require::<Vec<String>>("strengths").unwrap_err();
        assert!(matches!(err, WorkflowError::Shape(_)));
    }

    #[test]
    fn test_require_embedded_json_string() {
        #[derive(Deserialize)]
        struct Reasoning {
            reasons: Vec<String>,
        }
        let out = outputs(json!({"reasoning": "{\"reasons\": [\"strong CS program\"]}"}));
        let parsed: Reasoning = out.require_embedded("reasoning").unwrap();
        assert_eq!(parsed.reasons, vec!["strong CS program"]);
    }

    #[test]
    fn test_require_embedded_rejects_invalid_json() {
        let out = outputs(json!({"reasoning": "not json"}));
        let err = out.require_embedded::<Value>("reasoning").unwrap_err();
        assert!(matches!(err, WorkflowError::Shape(_)));
    }
}
