//! Switchboard LLM - Reasoning backend abstraction.
//!
//! This crate provides:
//! - The [`LlmProvider`] trait every reasoning backend implements
//! - Message, tool-call and tool-definition types
//! - [`OpenAiCompatProvider`] for Gemini's `OpenAI` endpoint, `OpenAI`,
//!   LM Studio, and any other `OpenAI`-compatible server

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod error;
mod openai_compat;
mod provider;
mod types;

pub use error::{LlmError, LlmResult};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::{LlmProvider, ProviderConfig};
pub use types::{
    LlmResponse, LlmToolDefinition, Message, MessageContent, MessageRole, StopReason, ToolCall,
    ToolCallResult, Usage,
};
