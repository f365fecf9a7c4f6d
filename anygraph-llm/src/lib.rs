//! LLM collaborator for the AnyGraph analysis backend.
//!
//! The model is a black-box text generator consumed over HTTP; everything
//! it returns is treated as adversarial input by the execution core, no
//! matter how much the provider is trusted. This crate owns the provider
//! client, the prompt templates and the small parsers that turn raw
//! completions into decisions and runnable code.

mod client;
mod codegen;
mod error;
mod prompts;

pub use client::{GeminiClient, GenerationOptions, ScriptedGenerator, TextGenerator};
pub use codegen::{parse_decision, strip_code_fences, Decision};
pub use error::{LlmError, LlmResult};
pub use prompts::{analysis_code_prompt, decision_prompt, render_columns};
