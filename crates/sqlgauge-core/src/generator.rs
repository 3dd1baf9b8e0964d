use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;

use crate::config::SamplingConfig;
use crate::prompts::PromptStrategy;

/// Turns (schema, question, prompt strategy) into a raw model completion.
/// The completion is returned as-is; SQL extraction happens downstream.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        schema_text: &str,
        question: &str,
        prompt: PromptStrategy,
        model_id: &str,
        sampling: &SamplingConfig,
    ) -> Result<String>;
}

/// Client for any OpenAI-compatible chat completions endpoint (Fireworks,
/// llama.cpp server, vLLM, ...).
pub struct OpenAiCompatGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompatGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl Generator for OpenAiCompatGenerator {
    async fn generate(
        &self,
        schema_text: &str,
        question: &str,
        prompt: PromptStrategy,
        model_id: &str,
        sampling: &SamplingConfig,
    ) -> Result<String> {
        let content = prompt.render(schema_text, question);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let mut request = self.client.post(&url).json(&json!({
            "model": model_id,
            "messages": [{"role": "user", "content": content}],
            "temperature": sampling.temperature,
            "max_tokens": sampling.max_tokens,
            "top_p": sampling.top_p,
            "presence_penalty": sampling.presence_penalty,
            "frequency_penalty": sampling.frequency_penalty,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body: serde_json::Value = response.json().await?;
        if !status.is_success() {
            return Err(anyhow!("HTTP {}: {}", status.as_u16(), body));
        }

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("completion response had no message content: {body}"))
    }
}
