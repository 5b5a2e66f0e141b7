//! The flow runner: one pass of validate → prompt → model → parse → verify.
//!
//! The model is never called for input that fails `Flow::validate()`, and no
//! output reaches the caller without passing `Verifier::verify()`. Fallback
//! outputs go through the same verification as model outputs.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use medichat_config::MediChatConfig;
use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    flow::InvocationId,
    outcome::{FlowOutcome, FlowRecord, ReplySource},
};

use crate::traits::{Flow, LlmClient, Verifier};

/// Drives flows against one model client.
///
/// The runner is stateless between calls; one instance can serve every flow
/// for the life of the process.
pub struct FlowRunner {
    client: Box<dyn LlmClient>,
    verifier: Box<dyn Verifier>,
    config: MediChatConfig,
}

impl FlowRunner {
    pub fn new(client: Box<dyn LlmClient>, verifier: Box<dyn Verifier>, config: MediChatConfig) -> Self {
        Self { client, verifier, config }
    }

    pub fn config(&self) -> &MediChatConfig {
        &self.config
    }

    /// Run `flow` once.
    ///
    /// # Pipeline
    ///
    /// 1. `flow.validate()`; invalid input returns before any model call
    /// 2. Resolve settings for `flow.id()` and build the request
    /// 3. `client.generate()` then `flow.parse()`
    /// 4. On a model failure, use `flow.fallback()` if it has one
    /// 5. Verify the serialized output against `flow.schema()`
    /// 6. Log the `FlowRecord` and return the outcome
    ///
    /// # Errors
    ///
    /// `InvalidInput` from validation, model failures when the flow has no
    /// fallback, and `VerificationFailed` when the output breaks its schema.
    pub fn run<F: Flow>(&self, flow: &F, input: F::Input) -> MediChatResult<FlowOutcome<F::Output>> {
        let flow_id = flow.id();
        let invocation_id = InvocationId::new();

        debug!(
            flow_id = %flow_id,
            invocation_id = %invocation_id.0,
            provider = self.client.name(),
            "flow run starting"
        );

        // ── Step 1: Validate ─────────────────────────────────────────────────
        flow.validate(&input)?;

        // ── Steps 2 & 3: Request, model call, parse ──────────────────────────
        let settings = self.config.settings_for(flow_id.as_str());
        let started = Instant::now();

        let attempt = flow
            .request(&input, &settings)
            .and_then(|request| {
                debug!(
                    flow_id = %flow_id,
                    model = %request.model,
                    prompt_chars = request.prompt.len(),
                    images = request.images.len(),
                    "calling model"
                );
                self.client.generate(&request)
            })
            .and_then(|reply| flow.parse(&input, &reply));

        // ── Step 4: Fallback ─────────────────────────────────────────────────
        let (output, source) = match attempt {
            Ok(output) => (output, ReplySource::Model),
            Err(err) if err.is_model_failure() => {
                warn!(
                    flow_id = %flow_id,
                    invocation_id = %invocation_id.0,
                    error = %err,
                    "model call failed"
                );
                match flow.fallback(&input) {
                    Some(fallback) => (fallback, ReplySource::Fallback),
                    None => return Err(err),
                }
            }
            Err(err) => return Err(err),
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        // ── Step 5: Verify ───────────────────────────────────────────────────
        let payload = serde_json::to_value(&output).map_err(|e| MediChatError::VerificationFailed {
            reason: format!("output is not serializable: {e}"),
        })?;
        let schema = flow.schema();
        let report = self.verifier.verify(&payload, &schema)?;
        if !report.passed {
            let summary = report.summary();
            warn!(
                flow_id = %flow_id,
                schema_id = %schema.schema_id,
                failures = %summary,
                "output verification failed"
            );
            return Err(MediChatError::VerificationFailed { reason: summary });
        }

        // ── Step 6: Record ───────────────────────────────────────────────────
        let record = FlowRecord {
            invocation_id,
            flow_id,
            source,
            duration_ms,
            timestamp: Utc::now(),
        };
        info!(
            flow_id = %record.flow_id,
            invocation_id = %record.invocation_id.0,
            source = ?record.source,
            duration_ms = record.duration_ms,
            "flow run complete"
        );

        Ok(FlowOutcome { output, record })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
