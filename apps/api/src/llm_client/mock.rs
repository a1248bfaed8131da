use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, TextGenerator};

enum Reply {
    Text(String),
    Fail(u16),
}

/// A scripted generator for tests.
///
/// Replies are matched by the first rule whose needle occurs in the prompt.
/// Every prompt is recorded so tests can assert what was sent upstream.
pub struct MockGenerator {
    rules: Vec<(String, Reply)>,
    default_reply: String,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(default_reply: &str) -> Self {
        Self {
            rules: Vec::new(),
            default_reply: default_reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replies with `text` when the prompt contains `needle`.
    pub fn reply_when(mut self, needle: &str, text: &str) -> Self {
        self.rules
            .push((needle.to_string(), Reply::Text(text.to_string())));
        self
    }

    /// Fails with an API error when the prompt contains `needle`.
    pub fn fail_when(mut self, needle: &str, status: u16) -> Self {
        self.rules.push((needle.to_string(), Reply::Fail(status)));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let rule = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()));

        match rule {
            Some((_, Reply::Text(text))) => Ok(text.clone()),
            Some((_, Reply::Fail(status))) => Err(LlmError::Api {
                status: *status,
                message: "MockGenerator: scripted failure".to_string(),
            }),
            None => Ok(self.default_reply.clone()),
        }
    }
}
