//! LLM integration module

pub mod client;
pub mod prompts;

pub use client::{GeminiClient, GenerationClient};
pub use prompts::{PromptDocument, PromptParams, PromptTemplates, TEMPLATE_VERSION};
