//! Prelude module - commonly used types for convenient import.
//!
//! Use `use switchboard_llm::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust,no_run
//! use switchboard_llm::prelude::*;
//!
//! # async fn example() -> LlmResult<()> {
//! let provider = OpenAiCompatProvider::gemini("your-api-key", "gemini-2.0-flash");
//!
//! let response = provider.complete_simple("Hello!").await?;
//! println!("Response: {response}");
//! # Ok(())
//! # }
//! ```

// Errors
pub use crate::{LlmError, LlmResult};

// Provider trait and config
pub use crate::{LlmProvider, ProviderConfig};

// Providers
pub use crate::OpenAiCompatProvider;

// Message types
pub use crate::{Message, MessageContent, MessageRole};

// Response types
pub use crate::{LlmResponse, StopReason, Usage};

// Tool types
pub use crate::{LlmToolDefinition, ToolCall, ToolCallResult};
