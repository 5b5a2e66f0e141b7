//! An in-process `LlmClient` that replays scripted replies.
//!
//! Used by tests across the workspace and by the CLI's `--offline` mode.
//! Replies are consumed in order; once the script is exhausted the optional
//! repeat reply is returned, otherwise the call fails like an unreachable
//! provider would.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    flow::GenerateRequest,
};

use crate::traits::LlmClient;

/// Scripted model client. Cheap to build with the chained constructors.
pub struct ScriptedLlm {
    script: Mutex<VecDeque<MediChatResult<String>>>,
    repeat: Option<String>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            repeat: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A client that answers every request with `reply`.
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            repeat: Some(reply.into()),
            ..Self::new()
        }
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    /// Queue a failure.
    pub fn fail(self, error: MediChatError) -> Self {
        self.push(Err(error))
    }

    /// Shared handle to every request received so far, in order.
    pub fn requests(&self) -> Arc<Mutex<Vec<GenerateRequest>>> {
        Arc::clone(&self.requests)
    }

    fn push(self, entry: MediChatResult<String>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
        self
    }
}

impl Default for ScriptedLlm {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmClient for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate(&self, request: &GenerateRequest) -> MediChatResult<String> {
        self.requests
            .lock()
            .map_err(|_| lock_poisoned())?
            .push(request.clone());

        let next = self.script.lock().map_err(|_| lock_poisoned())?.pop_front();
        match (next, &self.repeat) {
            (Some(entry), _) => entry,
            (None, Some(repeat)) => Ok(repeat.clone()),
            (None, None) => Err(MediChatError::ModelRequest {
                reason: "scripted client has no reply left".to_string(),
            }),
        }
    }
}

fn lock_poisoned() -> MediChatError {
    MediChatError::ModelRequest {
        reason: "scripted client lock poisoned".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_are_consumed_in_order() {
        let llm = ScriptedLlm::new().reply("one").reply("two");
        let req = GenerateRequest::text("m", "p");

        assert_eq!(llm.generate(&req).unwrap(), "one");
        assert_eq!(llm.generate(&req).unwrap(), "two");
        assert!(llm.generate(&req).is_err());
        assert_eq!(llm.requests().lock().unwrap().len(), 3);
    }

    #[test]
    fn repeating_never_runs_dry() {
        let llm = ScriptedLlm::repeating("same");
        let req = GenerateRequest::text("m", "p");
        for _ in 0..5 {
            assert_eq!(llm.generate(&req).unwrap(), "same");
        }
    }

    #[test]
    fn scripted_failure_is_returned() {
        let llm = ScriptedLlm::new().fail(MediChatError::ModelHttp {
            status: 500,
            body: "boom".to_string(),
        });
        let err = llm.generate(&GenerateRequest::text("m", "p")).unwrap_err();
        assert!(err.is_model_failure());
    }
}
