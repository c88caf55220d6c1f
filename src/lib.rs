//! # Weather Agent
//!
//! A chat endpoint backed by a tool-calling LLM agent.
//!
//! This library provides:
//! - An HTTP API with a single `POST /chat` operation
//! - A tool-calling agent loop over an OpenRouter-hosted model
//! - A `get_current_weather` tool built on the Open-Meteo geocoding and forecast APIs
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive a message via the API
//! 2. Build context with the prompt template and available tools
//! 3. Call the LLM, execute any tool calls it requests
//! 4. Feed results back to the LLM, repeat until it answers
//!
//! ## Example
//!
//! ```rust,ignore
//! use weather_agent::{config::Config, api};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
