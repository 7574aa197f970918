//! Scripted [`TextGenerator`] for tests.
//!
//! Responds through a closure and records every call, so tests can assert on
//! call counts, model order, and the exact content each call received
//! without any network access.

use std::sync::Mutex;

use futures::future::{BoxFuture, FutureExt};

use super::generation::{GenerationRequest, TextGenerator};
use crate::error::GenerationResult;

type Responder = Box<dyn Fn(&str, &GenerationRequest) -> GenerationResult + Send + Sync>;

/// One recorded call to a [`ScriptedGenerator`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub request: GenerationRequest,
}

/// A [`TextGenerator`] whose answers come from a closure.
pub struct ScriptedGenerator {
    responder: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGenerator {
    /// Answer every call with `responder(model, request)`.
    pub fn new(
        responder: impl Fn(&str, &GenerationRequest) -> GenerationResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with the same text.
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Model id of each call, in order.
    pub fn models_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }

    /// The request of the most recent call.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.calls().pop().map(|c| c.request)
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, GenerationResult> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                model: model.to_string(),
                request: request.clone(),
            });
        let result = (self.responder)(model, request);
        async move { result }.boxed()
    }
}
