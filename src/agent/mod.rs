//! Agent module - the tool-calling agent that answers chat messages.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build context with the prompt template and the user message
//! 2. Call the LLM with available tools
//! 3. If the LLM requests tool calls, execute them and feed results back
//! 4. Repeat until the LLM produces a final answer or max iterations is reached

mod agent_loop;
mod prompt;

pub use agent_loop::{Agent, AgentOutput, AgentStep, ITERATION_LIMIT_OUTPUT};
pub use prompt::{PromptTemplate, DEFAULT_SYSTEM_TEMPLATE};

use async_trait::async_trait;

/// Something that turns a user message into a final answer.
///
/// The HTTP layer only depends on this trait, so any engine can sit behind it.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn invoke(&self, input: &str) -> anyhow::Result<AgentOutput>;
}
