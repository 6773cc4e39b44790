//! Reqwest-based client for the `POST /run_code` service.

use std::error::Error as _;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

use super::{ExecutionBackend, ExecutionRequest, ExecutionResult};
use crate::config::Config;

const NO_OUTPUT: &str = "No output";

/// Reasons a call never produced a usable response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{}", describe_request_error(.0))]
    Request(#[from] reqwest::Error),
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected response: expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Clone)]
pub struct ExecutionClient {
    http: reqwest::Client,
    url: String,
}

impl ExecutionClient {
    /// No request timeout is configured: a run waits until the backend answers
    /// or the connection fails.
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, url: url.into() })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Self::new(cfg.run_code_url())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, code: &str) -> Result<ExecutionResult, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let request = ExecutionRequest { code: code.to_string() };
        let resp = self
            .http
            .post(&self.url)
            .headers(headers)
            .json(&request)
            .send()
            .await?;

        // Status codes are not inspected: the backend reports its own errors
        // (400/408/500) in the JSON body.
        let status = resp.status();
        let bytes = resp.bytes().await?;
        tracing::debug!(%status, len = bytes.len(), "run_code response received");

        let body: Value = serde_json::from_slice(&bytes)?;
        interpret_body(body)
    }
}

#[async_trait]
impl ExecutionBackend for ExecutionClient {
    async fn submit(&self, code: &str) -> ExecutionResult {
        tracing::debug!(url = %self.url, code_len = code.len(), "submitting code");
        match self.post(code).await {
            Ok(result) => {
                tracing::debug!(kind = result.kind(), "run settled");
                result
            }
            Err(err) => {
                tracing::warn!(error = %err, "run_code call failed");
                ExecutionResult::TransportError { message: err.to_string() }
            }
        }
    }
}

/// Map a decoded response body to a result.
///
/// A truthy `error` wins over everything else, including `success`.
pub fn interpret_body(body: Value) -> Result<ExecutionResult, TransportError> {
    let map = match body {
        Value::Object(map) => map,
        other => return Err(TransportError::NotAnObject(json_type(&other))),
    };

    if let Some(error) = map.get("error").filter(|v| is_truthy(v)) {
        return Ok(ExecutionResult::Failure { error: value_text(error) });
    }

    let output = match map.get("output") {
        None | Some(Value::Null) => NO_OUTPUT.to_string(),
        Some(v) => value_text(v),
    };
    let soft_failure = matches!(map.get("success"), Some(Value::Bool(false)));

    Ok(ExecutionResult::Success { output, soft_failure })
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// reqwest's Display stops at "error sending request"; the cause is usually
// the interesting part (connection refused, dns failure).
fn describe_request_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
