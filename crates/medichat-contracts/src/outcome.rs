//! Per-run records and the action response envelope.
//!
//! `FlowOutcome` is what the runner returns after each flow run.
//! `ActionResponse` is the `success`-flagged JSON shape handed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::{FlowId, InvocationId};

/// Where a flow's output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// Parsed from the model's reply.
    Model,
    /// The model call or parse failed and the flow's canned fallback was used.
    Fallback,
}

/// A record of one flow run, logged by the runner and returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRecord {
    pub invocation_id: InvocationId,
    pub flow_id: FlowId,
    pub source: ReplySource,
    /// Wall-clock time spent in the model call and parse.
    pub duration_ms: u64,
    /// When the run finished (UTC).
    pub timestamp: DateTime<Utc>,
}

/// The verified output of a flow run together with its record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowOutcome<T> {
    pub output: T,
    pub record: FlowRecord,
}

/// The envelope every action returns.
///
/// Exactly one of `data` and `error` is set; `success` mirrors which one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
