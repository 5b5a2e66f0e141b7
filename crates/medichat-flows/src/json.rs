//! Pulling a JSON object out of a model reply.
//!
//! JSON-mode replies are usually clean, but models still wrap them in code
//! fences or add a sentence before the object. The outermost `{...}` span is
//! taken and everything around it is ignored.

use serde::de::DeserializeOwned;

use medichat_contracts::error::{MediChatError, MediChatResult};

/// The outermost JSON object in `reply`, as text.
pub fn extract_json(reply: &str) -> MediChatResult<&str> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&reply[start..=end]),
        _ => Err(MediChatError::ResponseParsing {
            reason: "reply contains no JSON object".to_string(),
        }),
    }
}

/// Extract and deserialize the JSON object in `reply`.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> MediChatResult<T> {
    let object = extract_json(reply)?;
    serde_json::from_str(object).map_err(|e| MediChatError::ResponseParsing {
        reason: format!("reply JSON does not match the expected shape: {e}"),
    })
}
