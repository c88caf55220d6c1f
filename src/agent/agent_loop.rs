//! Core agent loop implementation.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::llm::{ChatMessage, LlmClient, OpenRouterClient, Role, ToolCall};
use crate::tools::{ToolRegistry, WeatherClient};

use super::prompt::PromptTemplate;
use super::AgentExecutor;

/// Output returned when the loop runs out of iterations.
pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";

/// One tool invocation and what it returned.
#[derive(Debug, Clone)]
pub struct AgentStep {
    pub tool: String,
    pub tool_input: Value,
    pub observation: String,
}

/// Final answer plus the tool calls that led to it.
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub output: String,
    pub intermediate_steps: Vec<AgentStep>,
}

/// The tool-calling agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    prompt: PromptTemplate,
    model: String,
    max_iterations: usize,
}

impl Agent {
    /// Create an agent from explicit parts.
    pub fn new(
        config: &Config,
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        prompt: PromptTemplate,
    ) -> Self {
        Self {
            llm,
            tools,
            prompt,
            model: config.default_model.clone(),
            max_iterations: config.max_iterations,
        }
    }

    /// Wire up the OpenRouter client, the weather tool and the prompt template.
    pub async fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();

        let llm = Arc::new(
            OpenRouterClient::with_base_url(config.api_key.clone(), config.llm_base_url.clone())
                .with_temperature(config.temperature),
        );
        let tools = ToolRegistry::with_weather(WeatherClient::with_client(
            http.clone(),
            &config.weather,
        ));
        let prompt = PromptTemplate::load(&http, config.prompt_template_url.as_deref()).await;

        Self::new(config, llm, tools, prompt)
    }

    /// Run the loop for a single user message.
    pub async fn run(&self, input: &str) -> anyhow::Result<AgentOutput> {
        let mut steps = Vec::new();

        let mut messages = vec![
            ChatMessage::system(self.prompt.render(&self.tools)),
            ChatMessage::user(input),
        ];

        let tool_schemas = self.tools.get_tool_schemas();

        for iteration in 0..self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let response = self
                .llm
                .chat_completion(&self.model, &messages, Some(tool_schemas.as_slice()))
                .await?;

            if let Some(tool_calls) = response.tool_calls.filter(|calls| !calls.is_empty()) {
                messages.push(ChatMessage {
                    role: Role::Assistant,
                    content: response.content.clone(),
                    tool_calls: Some(tool_calls.clone()),
                    tool_call_id: None,
                });

                for tool_call in &tool_calls {
                    let step = self.execute_tool_call(tool_call).await?;
                    tracing::info!(
                        "Tool {} returned: {}",
                        step.tool,
                        truncate_for_log(&step.observation, 1000)
                    );

                    messages.push(ChatMessage::tool_result(
                        tool_call.id.clone(),
                        step.observation.clone(),
                    ));
                    steps.push(step);
                }

                continue;
            }

            // No tool calls - this is the final response
            if let Some(content) = response.content {
                tracing::info!("Agent finished: {}", truncate_for_log(&content, 2000));
                return Ok(AgentOutput {
                    output: content,
                    intermediate_steps: steps,
                });
            }

            return Err(anyhow::anyhow!("LLM returned empty response"));
        }

        tracing::warn!(
            "Max iterations ({}) reached without completion",
            self.max_iterations
        );
        Ok(AgentOutput {
            output: ITERATION_LIMIT_OUTPUT.to_string(),
            intermediate_steps: steps,
        })
    }

    /// Execute a single tool call. Tool errors propagate; an unknown tool name
    /// is reported back to the model instead.
    async fn execute_tool_call(&self, tool_call: &ToolCall) -> anyhow::Result<AgentStep> {
        let name = &tool_call.function.name;
        let args = parse_arguments(&tool_call.function.arguments)
            .with_context(|| format!("Invalid arguments for tool {}", name))?;

        tracing::info!("Calling tool: {} with args: {}", name, args);

        let observation = match self.tools.get(name) {
            Some(tool) => tool.execute(args.clone()).await?,
            None => format!(
                "{} is not a valid tool, try one of [{}].",
                name,
                self.tools.names().join(", ")
            ),
        };

        Ok(AgentStep {
            tool: name.clone(),
            tool_input: args,
            observation,
        })
    }
}

#[async_trait]
impl AgentExecutor for Agent {
    async fn invoke(&self, input: &str) -> anyhow::Result<AgentOutput> {
        self.run(input).await
    }
}

fn parse_arguments(raw: &str) -> anyhow::Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_str(raw)?)
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated]", &s[..end])
    }
}
