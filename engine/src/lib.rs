//! Crop Advisor Engine Library
//!
//! This library provides the core functionality of the crop advisor.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Secret management module
pub mod secrets;

/// Telemetry and Observability
pub mod telemetry;

/// Corpus retrieval module
pub mod retriever;

/// Prompt templating module
pub mod prompt;

/// LLM provider abstraction layer
pub mod llm;

/// Question answering pipeline
pub mod advisor;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
