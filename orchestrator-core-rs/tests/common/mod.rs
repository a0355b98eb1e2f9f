#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use endpoint_registry::EndpointRegistry;
use model_transport::{ModelTransport, TransportError};
use orchestration_types::{CapabilityTag, EndpointDescriptor, PolicyConfig, SpecialistRequest};
use serde_json::{json, Value};

/// What a fake endpoint does when called
#[derive(Debug, Clone)]
pub enum Reply {
    Propose {
        action: String,
        confidence: f64,
        delay: Duration,
    },
    Refuse,
    Garbage,
    Hang,
}

pub fn propose(action: &str, confidence: f64) -> Reply {
    Reply::Propose {
        action: action.to_string(),
        confidence,
        delay: Duration::from_millis(50),
    }
}

/// Transport whose endpoints follow a per-address script
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<(String, CapabilityTag)>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, address: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(address.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<(String, CapabilityTag)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelTransport for ScriptedTransport {
    async fn invoke(
        &self,
        address: &str,
        capability: CapabilityTag,
        _request: &SpecialistRequest,
        _timeout: Duration,
    ) -> model_transport::Result<Value> {
        self.calls.lock().unwrap().push((address.to_string(), capability));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or(Reply::Refuse);

        match reply {
            Reply::Propose { action, confidence, delay } => {
                tokio::time::sleep(delay).await;
                Ok(json!({
                    "action": action,
                    "rationale": format!("{} looked best", action),
                    "confidence": confidence,
                }))
            }
            Reply::Refuse => Err(TransportError::connection(format!("connection refused: {}", address))),
            Reply::Garbage => Ok(Value::String("let me think about that".to_string())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Value::Null)
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Endpoint whose address is its id
pub fn endpoint(id: &str, tags: &[CapabilityTag], weight: f64) -> EndpointDescriptor {
    EndpointDescriptor::new(id, id, tags.iter().copied(), weight)
}

pub async fn registry_with(endpoints: Vec<EndpointDescriptor>) -> Arc<EndpointRegistry> {
    let registry = EndpointRegistry::new(3);
    for e in endpoints {
        registry.register(e).await.unwrap();
    }
    Arc::new(registry)
}

pub fn policy(threshold: f64, per_request_timeout: Duration) -> PolicyConfig {
    PolicyConfig {
        policy_threshold: threshold,
        per_request_timeout_ms: per_request_timeout.as_millis() as u64,
        ..PolicyConfig::default()
    }
}
