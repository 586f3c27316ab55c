/// Compiler Client - the seam between the session and the execution service
///
/// The dispatcher only sees `CompilerClient`. Production talks HTTP through
/// `HttpCompilerClient`; tests swap in scripted clients.

use codepad_common::error::TransportError;
use codepad_common::types::{CompileRequest, CompileResponse};
use serde::Deserialize;
use tracing::debug;

/// Longest slice of an error body carried into a test case's output
const MAX_ERROR_BODY_CHARS: usize = 500;

#[trait_variant::make(CompilerClient: Send)]
pub trait LocalCompilerClient {
    /// Submit one program run and return the service's raw response
    async fn compile(&self, request: &CompileRequest) -> Result<CompileResponse, TransportError>;
}

/// Calls the execution endpoint with `POST <endpoint>` and a JSON body.
///
/// No timeout is set here; whatever the endpoint enforces applies.
#[derive(Debug, Clone)]
pub struct HttpCompilerClient {
    http: reqwest::Client,
    endpoint: String,
}

/// Failure envelope the local proxy answers with
#[derive(Debug, Deserialize)]
struct FailureEnvelope {
    message: String,
}

impl HttpCompilerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

fn error_message_from_body(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<FailureEnvelope>(body) {
        return envelope.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

impl CompilerClient for HttpCompilerClient {
    async fn compile(&self, request: &CompileRequest) -> Result<CompileResponse, TransportError> {
        debug!(
            endpoint = %self.endpoint,
            language_id = request.language_id,
            source_size = request.source_code.len(),
            stdin_size = request.stdin.len(),
            "Sending compile request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
