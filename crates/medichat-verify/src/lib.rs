//! # medichat-verify
//!
//! Output verification for MediChat flows.
//!
//! [`engine::SchemaVerifier`] implements [`medichat_core::traits::Verifier`].
//! A payload is checked against the flow's JSON Schema document first, then
//! against each rule (`RequiredField`, `AllowedValues`, `ForbiddenPattern`,
//! `NonEmptyList`, `Custom`).
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use medichat_verify::engine::SchemaVerifier;
//!
//! let mut verifier = SchemaVerifier::new();
//! verifier.register_rule("has-summary", Box::new(|payload| {
//!     match payload.get("summary").and_then(|v| v.as_str()) {
//!         Some(s) if !s.trim().is_empty() => None,
//!         _ => Some("summary is empty".to_string()),
//!     }
//! }));
//! ```

pub mod engine;

pub use engine::{CustomVerifierFn, SchemaVerifier};
