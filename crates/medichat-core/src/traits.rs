//! Core trait definitions for the flow pipeline.
//!
//! - `LlmClient`: the hosted model (untrusted, may fail or ramble)
//! - `Flow`: one feature, with its prompt template, reply parser and output schema
//! - `Verifier`: checks a parsed output before it reaches the caller
//!
//! `FlowRunner` wires them together in a fixed order.

use serde::{de::DeserializeOwned, Serialize};

use medichat_config::FlowSettings;
use medichat_contracts::{
    error::MediChatResult,
    flow::{FlowId, GenerateRequest},
    verify::{OutputSchema, VerificationReport},
};

/// A text generation backend.
///
/// Implementations map `GenerateRequest` onto a provider's wire format and
/// return the concatenated reply text. They must not retry.
pub trait LlmClient: Send + Sync {
    /// Short provider name used in log fields.
    fn name(&self) -> &str;

    /// Send one request and return the reply text.
    fn generate(&self, request: &GenerateRequest) -> MediChatResult<String>;
}

/// One request/response feature.
///
/// A flow owns its prompt template, the parser that slices the model's
/// reply into `Output`, and the schema the parsed output must satisfy. It
/// never calls the model itself; the runner does.
pub trait Flow: Send + Sync {
    type Input;
    type Output: Serialize + DeserializeOwned;

    /// Stable id, also the key for `[flows.<id>]` in the config file.
    fn id(&self) -> FlowId;

    /// Form-level checks. Return `MediChatError::InvalidInput` with a
    /// message fit for the end user.
    fn validate(&self, input: &Self::Input) -> MediChatResult<()>;

    /// Render the prompt and build the model request.
    fn request(&self, input: &Self::Input, settings: &FlowSettings) -> MediChatResult<GenerateRequest>;

    /// Turn the model's reply into the flow output.
    fn parse(&self, input: &Self::Input, reply: &str) -> MediChatResult<Self::Output>;

    /// Canned output used when the model call or parse fails.
    ///
    /// Flows without a sensible fallback keep the default and let the error
    /// propagate.
    fn fallback(&self, _input: &Self::Input) -> Option<Self::Output> {
        None
    }

    /// The schema the output is verified against.
    fn schema(&self) -> OutputSchema;
}

/// The output verifier: the last gate before an output is returned.
pub trait Verifier: Send + Sync {
    /// Verify `payload` (the serialized output) against `schema`.
    ///
    /// Return `passed = false` with populated `failures` when any rule
    /// fails. `Err` is reserved for the verifier itself being unusable.
    fn verify(
        &self,
        payload: &serde_json::Value,
        schema: &OutputSchema,
    ) -> MediChatResult<VerificationReport>;
}
