use std::time::Duration;

use doctopdf_core::{AgentResponse, Artifact};
use doctopdf_logging::{dtp_debug, dtp_warn};
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::Value;

use crate::{FailureKind, GatewayError};

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    /// Upper bound for the whole delegated call.
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl GatewaySettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_response_bytes: 2 * 1024 * 1024,
        }
    }
}

/// The external agent service: one prompt in, one structured reply out.
#[async_trait::async_trait]
pub trait AgentGateway: Send + Sync {
    async fn invoke(&self, prompt: &str, agent_id: &str) -> Result<AgentResponse, GatewayError>;
}

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    message: &'a str,
    agent_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpAgentGateway {
    settings: GatewaySettings,
}

impl HttpAgentGateway {
    pub fn new(settings: GatewaySettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, GatewayError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| GatewayError::new(FailureKind::Network, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> GatewayError {
        GatewayError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_response_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl AgentGateway for HttpAgentGateway {
    async fn invoke(&self, prompt: &str, agent_id: &str) -> Result<AgentResponse, GatewayError> {
        let endpoint = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| GatewayError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        let client = self.build_client()?;

        let mut request = client.post(endpoint).json(&InvokeRequest {
            message: prompt,
            agent_id,
        });
        if let Some(key) = self.settings.api_key.as_deref() {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_response_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_response_bytes {
                return Err(self.too_large(next_len));
            }
            body.extend_from_slice(&chunk);
        }
        dtp_debug!(
            "Agent replied status={} body_len={}",
            status.as_u16(),
            body.len()
        );

        match serde_json::from_slice::<Value>(&body) {
            Ok(envelope) if envelope.is_object() => {
                let mut reply = decode_envelope(&envelope);
                if !status.is_success() {
                    dtp_warn!("Agent returned status {} with an error envelope", status);
                    reply.success = false;
                }
                Ok(reply)
            }
            _ if !status.is_success() => Err(GatewayError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            )),
            Ok(_) => Err(GatewayError::new(
                FailureKind::Decode,
                "reply is not a JSON object",
            )),
            Err(err) => Err(GatewayError::new(FailureKind::Decode, err.to_string())),
        }
    }
}

/// Maps the service envelope
/// `{success, response: {result}, module_outputs: {artifact_files}, error}`.
/// Unknown or mistyped members are treated as absent.
pub fn decode_envelope(envelope: &Value) -> AgentResponse {
    AgentResponse {
        success: envelope
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        result: envelope
            .get("response")
            .and_then(|response| response.get("result"))
            .cloned(),
        artifacts: envelope
            .get("module_outputs")
            .and_then(|outputs| outputs.get("artifact_files"))
            .map(decode_artifacts)
            .unwrap_or_default(),
        error: envelope
            .get("error")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
    }
}

fn decode_artifacts(files: &Value) -> Vec<Artifact> {
    let Some(files) = files.as_array() else {
        return Vec::new();
    };
    files
        .iter()
        .filter_map(Value::as_object)
        .map(|file| {
            let text = |key: &str| file.get(key).and_then(Value::as_str).map(ToOwned::to_owned);
            Artifact {
                url: text("file_url").unwrap_or_default(),
                name: text("name"),
                format_type: text("format_type"),
            }
        })
        .collect()
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        return GatewayError::new(FailureKind::Timeout, err.to_string());
    }
    GatewayError::new(FailureKind::Network, err.to_string())
}
