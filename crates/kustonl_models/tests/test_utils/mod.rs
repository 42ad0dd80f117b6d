//! Test utilities for kustonl_models tests.

use async_trait::async_trait;
use kustonl_models::{
    ChatCompletionRequest, ChatCompletionResponse, Choice, ChoiceMessage, CompletionDriver,
    CompletionError, CompletionErrorKind, CompletionResult,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the mock should answer.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer with this text as the first choice
    Reply(String),
    /// Answer with a choice whose content is null
    Filtered,
    /// Fail with this error kind
    Fail(CompletionErrorKind),
}

/// Completion driver that records requests instead of calling an endpoint.
pub struct MockDriver {
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatCompletionRequest>>,
}

impl MockDriver {
    pub fn replying(text: &str) -> Self {
        Self::new(MockBehavior::Reply(text.to_string()))
    }

    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatCompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

/// A response envelope with one choice.
pub fn envelope(content: Option<&str>) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "chatcmpl-test".to_string(),
        object: "chat.completion".to_string(),
        created: 1_700_000_000,
        model: "gpt-4o-mini".to_string(),
        choices: vec![Choice {
            index: 0,
            message: ChoiceMessage {
                role: "assistant".to_string(),
                content: content.map(str::to_string),
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

#[async_trait]
impl CompletionDriver for MockDriver {
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> CompletionResult<ChatCompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.behavior {
            MockBehavior::Reply(text) => Ok(envelope(Some(text))),
            MockBehavior::Filtered => Ok(envelope(None)),
            MockBehavior::Fail(kind) => Err(CompletionError::new(kind.clone())),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
