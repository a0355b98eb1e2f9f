//! HTTP transport for OpenAI-compatible chat completion servers
//!
//! Each specialist runs behind its own server (LM Studio, llama.cpp, vLLM
//! and friends all speak the same `/v1/chat/completions` dialect). The
//! request is rendered into a system prompt for the capability plus the
//! serialized [`SpecialistRequest`] as the user turn.

mod models;
pub use models::*;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use orchestration_types::{CapabilityTag, SpecialistRequest};
use reqwest::{header, Client};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::core::ModelTransport;
use crate::error::{Result, TransportError};
use crate::extract::extract_structured;
use crate::resilience::{RetryConfig, RetryExecutor};

const USER_AGENT: &str = concat!("disruption-orchestrator/", env!("CARGO_PKG_VERSION"));

/// Sampling settings for one capability; unset fields fall back to the
/// transport-wide values
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CapabilityTuning {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CapabilityTuning {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
        }
    }
}

/// Settings shared by every call this transport makes
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Bearer token; local servers accept anything
    pub api_key: String,

    /// Model name used when the endpoint does not pin one
    pub default_model: String,

    pub max_tokens: u32,

    pub temperature: f32,

    /// Per-capability overrides of `temperature` and `max_tokens`
    pub capability_tuning: HashMap<CapabilityTag, CapabilityTuning>,

    pub retry: RetryConfig,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            api_key: "lm-studio".to_string(),
            default_model: "local-model".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            capability_tuning: HashMap::new(),
            retry: RetryConfig::default(),
        }
    }
}

impl HttpTransportConfig {
    /// Temperature and max tokens to use for `capability`
    pub fn sampling_for(&self, capability: CapabilityTag) -> (f32, u32) {
        let tuning = self.capability_tuning.get(&capability).copied().unwrap_or_default();
        (
            tuning.temperature.unwrap_or(self.temperature),
            tuning.max_tokens.unwrap_or(self.max_tokens),
        )
    }
}

pub struct HttpModelTransport {
    http_client: Client,
    config: HttpTransportConfig,
    retry: RetryExecutor,
}

impl HttpModelTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            retry: RetryExecutor::new(config.retry.clone()),
            config,
        })
    }

    pub fn builder() -> HttpModelTransportBuilder {
        HttpModelTransportBuilder::default()
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    fn build_chat_request(&self, capability: CapabilityTag, request: &SpecialistRequest) -> Result<ChatCompletionRequest> {
        let payload = serde_json::to_string(request)
            .map_err(|e| TransportError::protocol(format!("failed to serialize request: {}", e)))?;
        let (temperature, max_tokens) = self.config.sampling_for(capability);

        Ok(ChatCompletionRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.default_model.clone()),
            messages: vec![
                ChatMessage::system(system_prompt(capability)),
                ChatMessage::user(payload),
            ],
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
            stream: Some(false),
        })
    }

    async fn send_once(&self, url: &str, body: &ChatCompletionRequest, remaining: Duration) -> Result<Value> {
        let response = self
            .http_client
            .post(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .timeout(remaining)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                code: status.as_u16(),
                body: truncate(&text, 512),
            });
        }

        // Not a chat completion: hand the raw body back as model output
        let completion: ChatCompletionResponse = match serde_json::from_str(&text) {
            Ok(completion) => completion,
            Err(e) => {
                debug!("Response is not a chat completion: {}", e);
                return Ok(Value::String(text));
            }
        };

        Ok(match completion.first_content() {
            Some(content) => extract_structured(content),
            None => Value::Null,
        })
    }
}

#[async_trait]
impl ModelTransport for HttpModelTransport {
    async fn invoke(
        &self,
        address: &str,
        capability: CapabilityTag,
        request: &SpecialistRequest,
        timeout: Duration,
    ) -> Result<Value> {
        let deadline = Instant::now() + timeout;
        let url = completions_url(address);
        let body = self.build_chat_request(capability, request)?;

        debug!(url = %url, capability = %capability, model = %body.model, "Invoking specialist");

        let (target, payload) = (url.as_str(), &body);
        let attempt = self.retry.execute(deadline, move || {
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.send_once(target, payload, remaining)
        });

        match tokio::time::timeout_at(deadline, attempt).await {
            Ok(result) => {
                if let Err(ref e) = result {
                    warn!(url = %url, capability = %capability, "Specialist call failed: {}", e);
                }
                result
            }
            Err(_) => Err(TransportError::timeout(format!(
                "no reply from {} within {:?}",
                url, timeout
            ))),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Builder for [`HttpModelTransport`]
#[derive(Debug, Default)]
pub struct HttpModelTransportBuilder {
    config: HttpTransportConfig,
}

impl HttpModelTransportBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn capability_tuning(mut self, capability: CapabilityTag, tuning: CapabilityTuning) -> Self {
        self.config.capability_tuning.insert(capability, tuning);
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn build(self) -> Result<HttpModelTransport> {
        HttpModelTransport::new(self.config)
    }
}

/// `http://host:1234`, `http://host:1234/` and `http://host:1234/v1` all
/// resolve to the same completions URL
pub fn completions_url(address: &str) -> String {
    let base = address.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{}/chat/completions", base)
    } else {
        format!("{}/v1/chat/completions", base)
    }
}

fn system_prompt(capability: CapabilityTag) -> String {
    let role = match capability {
        CapabilityTag::RouteOptimization => {
            "route optimization specialist. Propose the rerouting or scheduling change that best limits delivery delay"
        }
        CapabilityTag::CustomerCommunication => {
            "customer communication specialist. Propose how to inform and compensate the affected customer"
        }
        CapabilityTag::StrategicPlanning => {
            "strategic planning specialist. Propose the operational response that best protects the business"
        }
        CapabilityTag::EmergencyResponse => {
            "emergency response specialist. Propose the immediate action that resolves the disruption fastest"
        }
    };

    format!(
        "You are the {} for a last-mile delivery operation. \
         The user message is a JSON description of a disruption. \
         Reply with a single JSON object and nothing else: \
         {{\"action\": string, \"rationale\": string, \"confidence\": number between 0 and 1}}.",
        role
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}
