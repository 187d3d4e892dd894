//! Language-model service boundary.
//!
//! The pipeline consumes the service through one narrow operation: a prompt
//! string in, a completion string out. The prompt is the only shape
//! enforcement the service gets, which is exactly why the query guard exists
//! as an independent layer on the way back.

mod client;

pub use client::GeminiClient;

use async_trait::async_trait;

use crate::error::LlmError;

/// One request/response operation against a hosted text-generation service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete a prompt. Implementations own their timeout and retry
    /// policy; callers treat any `Err` as a stage failure.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted in-process client for exercising the pipeline without a
    //! network.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::error::LlmError;

    use super::CompletionClient;

    /// Replays a fixed sequence of replies and records every prompt it saw.
    pub struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, String>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        pub fn new<I>(replies: I) -> Self
        where
            I: IntoIterator<Item = Result<&'static str, &'static str>>,
        {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().push(prompt.to_string());
            match self.replies.lock().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(LlmError::Transport(message)),
                None => Err(LlmError::EmptyCompletion),
            }
        }
    }
}
