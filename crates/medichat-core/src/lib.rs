//! # medichat-core
//!
//! The request/response pipeline shared by every MediChat AI feature.
//!
//! This crate provides:
//! - The three core traits (`LlmClient`, `Flow`, `Verifier`)
//! - The `FlowRunner` that wires them together in a fixed order
//! - `GeminiClient`, the production `LlmClient`
//! - `ScriptedLlm`, an in-process client for tests and offline runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medichat_core::{FlowRunner, gemini::GeminiClient};
//!
//! let client = GeminiClient::from_config(&config)?;
//! let runner = FlowRunner::new(Box::new(client), Box::new(verifier), config);
//! let outcome = runner.run(&flow, input)?;
//! ```

pub mod gemini;
pub mod runner;
pub mod scripted;
pub mod traits;

pub use runner::FlowRunner;
