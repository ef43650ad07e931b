//! Scripted adapters shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use keyrelay::{AdapterError, Credential, LlmRequest, ProviderAdapter, ProviderType};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Script = Box<dyn Fn(&str) -> Result<String, AdapterError> + Send + Sync>;

/// One recorded adapter call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub secret: String,
    pub model: String,
    pub prompt: String,
    pub params: HashMap<String, Value>,
}

/// Adapter whose outcome is decided by a closure over the key used
pub struct ScriptedAdapter {
    provider: ProviderType,
    default_model: String,
    delay: Option<Duration>,
    script: Script,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedAdapter {
    pub fn new<F>(provider: ProviderType, script: F) -> Self
    where
        F: Fn(&str) -> Result<String, AdapterError> + Send + Sync + 'static,
    {
        Self {
            provider,
            default_model: "scripted-default".to_string(),
            delay: None,
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Adapter that answers every call with `text`
    pub fn answering(provider: ProviderType, text: &str) -> Self {
        let text = text.to_string();
        Self::new(provider, move |_| Ok(text.clone()))
    }

    /// Adapter that fails every call with `err`
    pub fn failing(provider: ProviderType, err: AdapterError) -> Self {
        Self::new(provider, move |_| Err(err.clone()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_default_model(mut self, model: &str) -> Self {
        self.default_model = model.to_string();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Secrets in the order they were used
    pub fn secrets_used(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.secret).collect()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    async fn call(&self, credential: &Credential, model: &str, request: &LlmRequest) -> Result<String, AdapterError> {
        self.calls.lock().unwrap().push(Call {
            secret: credential.secret().to_string(),
            model: model.to_string(),
            prompt: request.prompt.clone(),
            params: request.params.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.script)(credential.secret())
    }

    fn provider(&self) -> ProviderType {
        self.provider
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}
