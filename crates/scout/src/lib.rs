//! Scout - chat completions with optional web-search augmentation
//!
//! This crate provides a daemon that forwards chat conversations to an
//! OpenAI-compatible LLM, optionally grounding the answer in live search
//! results, and returns the reply as JSON or as a stream of SSE frames.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod proxy;
pub mod search;
pub mod testing;

pub use error::ScoutError;
