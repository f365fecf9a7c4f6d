//! Analyst pipeline: schema + conversation + LLM + sandbox, composed into
//! one call that turns a natural-language query into a chat reply.

mod analyst;
mod config;

pub use analyst::{Analyst, AnalystReply};
pub use config::{AppConfig, ConfigError, LlmSettings, SandboxSettings};
