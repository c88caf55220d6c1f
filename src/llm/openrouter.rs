//! OpenRouter chat-completions client.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatCompletion, ChatMessage, LlmClient, ToolCall, ToolSchema};

/// Client for any OpenAI-compatible endpoint, OpenRouter in production.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSchema]>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

impl OpenRouterClient {
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> anyhow::Result<ChatCompletion> {
        let request = CompletionRequest {
            model,
            messages,
            tools: tools.filter(|t| !t.is_empty()),
            temperature: self.temperature,
        };

        tracing::debug!(
            "LLM request: model={} messages={} tools={}",
            model,
            messages.len(),
            request.tools.map(|t| t.len()).unwrap_or(0)
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach LLM provider")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read LLM response body")?;

        if !status.is_success() {
            tracing::error!("LLM API error ({}): {}", status, body);
            return Err(anyhow::anyhow!("LLM API error ({}): {}", status, body));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse LLM response: {}", body))?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| anyhow::anyhow!("LLM response contained no choices"))?;

        Ok(ChatCompletion {
            content: message.content,
            tool_calls: message.tool_calls,
        })
    }
}
