//! Request Dispatcher — fans prompts out to the generation service and assembles results.
//!
//! Two policies:
//! - per-task: one concurrent call per task kind, each failure isolated to its own entry
//! - aggregated: one combined call, parsed as JSON with a raw-text fallback

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm_client::{strip_json_fences, LlmError, TextGenerator};
use crate::tasks::kind::TaskKind;
use crate::tasks::prompts::{build_aggregated_prompt, build_prompt};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One task kind applied to one piece of text.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRequest {
    #[serde(rename = "filter")]
    pub kind: TaskKind,
    #[serde(rename = "prompt")]
    pub text: String,
}

/// Outcome of a single upstream call, before it is shaped for the wire.
#[derive(Debug)]
pub struct TaskResult {
    pub kind: TaskKind,
    pub outcome: Result<String, LlmError>,
}

/// Wire shape of a per-task result: `{filter, content}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    pub filter: TaskKind,
    pub content: String,
}

impl From<TaskResult> for FilterResult {
    fn from(result: TaskResult) -> Self {
        let content = match result.outcome {
            Ok(text) => text,
            Err(_) => failure_placeholder(&result.kind),
        };
        FilterResult {
            filter: result.kind,
            content,
        }
    }
}

/// Payload of the aggregated endpoint, serialized under `response`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregatedReply {
    Conversation { conversation: String },
    Structured(Value),
    Fallback { fallback: String },
}

pub fn failure_placeholder(kind: &TaskKind) -> String {
    format!("Error: Could not process the '{kind}' filter.")
}

// ────────────────────────────────────────────────────────────────────────────
// Per-task dispatch
// ────────────────────────────────────────────────────────────────────────────

async fn run_task(llm: &dyn TextGenerator, request: PromptRequest) -> TaskResult {
    let prompt = build_prompt(&request.kind, &request.text);
    debug!("Sending {} prompt: {}", request.kind, prompt);

    let outcome = llm.generate(&prompt).await;
    match &outcome {
        Ok(text) => debug!("Received {} reply: {}", request.kind, text),
        Err(e) => warn!("Filter {} failed: {e}", request.kind),
    }

    TaskResult {
        kind: request.kind,
        outcome,
    }
}

/// Runs every request concurrently and returns results in request order.
/// Never fails as a whole: a failed call becomes a placeholder entry.
pub async fn dispatch_requests(
    llm: &dyn TextGenerator,
    requests: Vec<PromptRequest>,
) -> Vec<FilterResult> {
    let futures = requests.into_iter().map(|request| run_task(llm, request));
    join_all(futures)
        .await
        .into_iter()
        .map(FilterResult::from)
        .collect()
}

/// Applies each kind to the same text, one concurrent call per kind.
pub async fn dispatch_per_task(
    llm: &dyn TextGenerator,
    text: &str,
    kinds: Vec<TaskKind>,
) -> Vec<FilterResult> {
    let requests = kinds
        .into_iter()
        .map(|kind| PromptRequest {
            kind,
            text: text.to_string(),
        })
        .collect();
    dispatch_requests(llm, requests).await
}

/// Runs a single task and returns the raw text, propagating upstream failure.
pub async fn dispatch_single(
    llm: &dyn TextGenerator,
    kind: TaskKind,
    text: &str,
) -> Result<String, LlmError> {
    let request = PromptRequest {
        kind,
        text: text.to_string(),
    };
    run_task(llm, request).await.outcome
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregated dispatch
// ────────────────────────────────────────────────────────────────────────────

/// Issues one combined call for all `kinds`.
///
/// Empty `kinds` means conversation mode and the reply is returned as-is.
/// Otherwise the reply must be JSON; anything else is wrapped under `fallback`.
pub async fn dispatch_aggregated(
    llm: &dyn TextGenerator,
    text: &str,
    kinds: &[TaskKind],
) -> Result<AggregatedReply, LlmError> {
    for kind in kinds.iter().filter(|k| !k.is_recognized()) {
        warn!("Task {kind} has no JSON schema and is left out of the aggregated prompt");
    }

    let prompt = build_aggregated_prompt(text, kinds);
    debug!("Sending aggregated prompt: {}", prompt);

    let reply = llm.generate(&prompt).await?;
    debug!("Received aggregated reply: {}", reply);

    if kinds.is_empty() {
        return Ok(AggregatedReply::Conversation {
            conversation: reply,
        });
    }

    Ok(parse_structured_reply(&reply))
}

fn parse_structured_reply(reply: &str) -> AggregatedReply {
    match serde_json::from_str::<Value>(strip_json_fences(reply)) {
        Ok(value) => AggregatedReply::Structured(value),
        Err(e) => {
            warn!("Aggregated reply was not valid JSON: {e}");
            AggregatedReply::Fallback {
                fallback: format!(
                    "The AI response was not in the correct format, but here is the raw text: {reply}"
                ),
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::llm_client::mock::MockGenerator;

    #[tokio::test]
    async fn test_per_task_preserves_order() {
        let llm = MockGenerator::new("default")
            .reply_when("Correct any grammatical", "I am going to school")
            .reply_when("Translate the following", "আমি স্কুলে যাচ্ছি");

        let results = dispatch_per_task(
            &llm,
            "I is going to school",
            vec![TaskKind::TranslateToBengali, TaskKind::CorrectGrammar],
        )
        .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].filter, TaskKind::TranslateToBengali);
        assert_eq!(results[0].content, "আমি স্কুলে যাচ্ছি");
        assert_eq!(results[1].filter, TaskKind::CorrectGrammar);
        assert_eq!(results[1].content, "I am going to school");
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_task_becomes_placeholder_only_for_itself() {
        let llm = MockGenerator::new("fine")
            .fail_when("Rephrase the following", 500)
            .reply_when("Explain the meaning", "It means...");

        let results = dispatch_per_task(
            &llm,
            "break a leg",
            vec![TaskKind::RephraseFluently, TaskKind::ExplainThis],
        )
        .await;

        assert_eq!(
            results[0].content,
            "Error: Could not process the 'RephraseFluently' filter."
        );
        assert_eq!(results[1].content, "It means...");
    }

    #[tokio::test]
    async fn test_heterogeneous_requests_use_own_text() {
        let llm = MockGenerator::new("ok");
        let requests = vec![
            PromptRequest {
                kind: TaskKind::Pronounce,
                text: "thorough".to_string(),
            },
            PromptRequest {
                kind: TaskKind::Describe,
                text: "a red fox".to_string(),
            },
        ];

        let results = dispatch_requests(&llm, requests).await;
        assert_eq!(results.len(), 2);

        let prompts = llm.prompts();
        assert!(prompts.iter().any(|p| p.contains("\"thorough\"")));
        assert!(prompts.iter().any(|p| p.contains("\"a red fox\"")));
    }

    #[tokio::test]
    async fn test_unknown_kind_round_trips_with_general_prompt() {
        let llm = MockGenerator::new("Sure!");
        let results = dispatch_per_task(&llm, "hi", vec![TaskKind::parse("Chat")]).await;

        assert_eq!(results[0].filter, TaskKind::Other("Chat".to_string()));
        assert!(llm.prompts()[0].starts_with("Act as a helpful general assistant"));
    }

    /// Sleeps for a per-kind delay so completion order differs from request order.
    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            let delay = if prompt.contains("Bengali") { 300 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(format!("done after {delay}ms"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_run_concurrently() {
        let start = tokio::time::Instant::now();
        let results = dispatch_per_task(
            &SlowGenerator,
            "text",
            vec![
                TaskKind::TranslateToBengali,
                TaskKind::Describe,
                TaskKind::Pronounce,
            ],
        )
        .await;

        // Only the slowest call sets the total latency.
        assert!(start.elapsed() < Duration::from_millis(320));
        assert_eq!(results[0].content, "done after 300ms");
        assert_eq!(results[2].content, "done after 10ms");
    }

    #[tokio::test]
    async fn test_single_dispatch_propagates_failure() {
        let llm = MockGenerator::new("x").fail_when("phonetic", 503);
        let result = dispatch_single(&llm, TaskKind::Pronounce, "colonel").await;
        assert!(matches!(result, Err(LlmError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_aggregated_empty_tasks_is_conversation() {
        let llm = MockGenerator::new("Hi there! How was your day?");
        let reply = dispatch_aggregated(&llm, "Hello", &[]).await.unwrap();

        assert_eq!(
            reply,
            AggregatedReply::Conversation {
                conversation: "Hi there! How was your day?".to_string()
            }
        );
        assert!(llm.prompts()[0].contains("conversation partner"));
    }

    #[tokio::test]
    async fn test_aggregated_parses_json_reply() {
        let llm = MockGenerator::new(
            r#"{"correction":{"hasError":true,"correctedText":"I am going to school"}}"#,
        );
        let reply = dispatch_aggregated(&llm, "I is going to school", &[TaskKind::CorrectGrammar])
            .await
            .unwrap();

        assert_eq!(
            reply,
            AggregatedReply::Structured(json!({
                "correction": {"hasError": true, "correctedText": "I am going to school"}
            }))
        );
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_aggregated_accepts_fenced_json() {
        let llm = MockGenerator::new("```json\n{\"description\":\"A greeting.\"}\n```");
        let reply = dispatch_aggregated(&llm, "Hello", &[TaskKind::Describe])
            .await
            .unwrap();
        assert_eq!(
            reply,
            AggregatedReply::Structured(json!({"description": "A greeting."}))
        );
    }

    #[tokio::test]
    async fn test_aggregated_malformed_json_falls_back_to_raw_text() {
        let llm = MockGenerator::new("Sorry, here is plain prose.");
        let reply = dispatch_aggregated(&llm, "Hello", &[TaskKind::Describe])
            .await
            .unwrap();

        match reply {
            AggregatedReply::Fallback { fallback } => {
                assert!(fallback.ends_with("Sorry, here is plain prose."))
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_aggregated_upstream_failure_propagates() {
        let llm = MockGenerator::new("unused").fail_when("USER INPUT", 500);
        let result = dispatch_aggregated(&llm, "Hello", &[TaskKind::Describe]).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_aggregated_reply_wire_shapes() {
        let conversation = AggregatedReply::Conversation {
            conversation: "hey".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&conversation).unwrap(),
            json!({"conversation": "hey"})
        );

        let fallback = AggregatedReply::Fallback {
            fallback: "raw".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&fallback).unwrap(),
            json!({"fallback": "raw"})
        );
    }
}
