//! Execution protocol: request/result types and the backend seam.

use async_trait::async_trait;
use serde::Serialize;

pub mod client;

pub use client::ExecutionClient;

/// Body of `POST /run_code`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRequest {
    pub code: String,
}

/// Outcome of one execution attempt. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The backend ran the code. `soft_failure` is set when it reported
    /// `success: false` without an `error` message.
    Success { output: String, soft_failure: bool },
    /// The backend understood the request but reported an error.
    Failure { error: String },
    /// The call itself did not complete.
    TransportError { message: String },
}

impl ExecutionResult {
    #[cfg(test)]
    pub fn success(output: impl Into<String>) -> Self {
        Self::Success { output: output.into(), soft_failure: false }
    }

    /// The code ran and the backend reported no failure of any kind.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { soft_failure: false, .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { soft_failure: false, .. } => "success",
            Self::Success { soft_failure: true, .. } => "soft_failure",
            Self::Failure { .. } => "failure",
            Self::TransportError { .. } => "transport_error",
        }
    }
}

/// Something that can execute a source buffer remotely.
///
/// Implementations never fail: every failure is folded into
/// [`ExecutionResult`].
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn submit(&self, code: &str) -> ExecutionResult;
}
