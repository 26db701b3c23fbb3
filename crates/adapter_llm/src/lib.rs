//! # adapter_llm
//!
//! Narrative generation for the risk analyzer through an OpenAI-compatible
//! `chat/completions` endpoint.
//!
//! ## Architecture Position
//!
//! **A**dapter layer of the A-I-P-S architecture. Implements
//! `risk_core::TextGenerator`; transport, status and decoding failures all
//! surface to the core as `RiskError::Generation`.

#![deny(missing_docs)]

pub mod chat;
pub mod client;

mod error;

pub use client::{ChatSettings, OpenAiChatGenerator, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use error::LlmError;
