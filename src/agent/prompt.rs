//! Agent prompt template.
//!
//! The template is fetched from a remote registry at startup. When no registry
//! is configured, or the fetch fails, the built-in template is used instead.

use std::time::Duration;

use reqwest::Client;

use crate::tools::ToolRegistry;

/// Built-in system template.
pub const DEFAULT_SYSTEM_TEMPLATE: &str = "You are a helpful assistant";

/// Placeholder replaced by the list of available tools.
const TOOLS_PLACEHOLDER: &str = "{tools}";

/// System instructions given to the model ahead of the user's message.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    system: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_TEMPLATE)
    }
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }

    /// Pull the template from `url`, falling back to the built-in one.
    pub async fn load(client: &Client, url: Option<&str>) -> Self {
        let Some(url) = url else {
            tracing::info!("No prompt template registry configured, using built-in template");
            return Self::default();
        };

        match Self::fetch(client, url).await {
            Ok(template) => {
                tracing::info!("Loaded prompt template from {}", url);
                template
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch prompt template from {}: {:#}. Using built-in template.",
                    url,
                    e
                );
                Self::default()
            }
        }
    }

    /// Fetch the template body from a remote registry.
    pub async fn fetch(client: &Client, url: &str) -> anyhow::Result<Self> {
        let response = client
            .get(url)
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", status));
        }

        let body = response.text().await?;
        let body = body.trim();
        if body.is_empty() {
            return Err(anyhow::anyhow!("empty template"));
        }

        Ok(Self::new(body))
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Render the system message, substituting `{tools}` when present.
    pub fn render(&self, tools: &ToolRegistry) -> String {
        if !self.system.contains(TOOLS_PLACEHOLDER) {
            return self.system.clone();
        }

        let tool_descriptions = tools
            .list_tools()
            .iter()
            .map(|t| format!("- **{}**: {}", t.name, t.description))
            .collect::<Vec<_>>()
            .join("\n");

        self.system.replace(TOOLS_PLACEHOLDER, &tool_descriptions)
    }
}
