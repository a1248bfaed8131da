//! Axum route handlers for the task endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::tasks::dispatcher::{
    dispatch_aggregated, dispatch_per_task, dispatch_requests, dispatch_single, AggregatedReply,
    FilterResult, PromptRequest,
};
use crate::tasks::kind::TaskKind;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub prompt: Option<String>,
    #[serde(default)]
    pub tasks: Option<Vec<TaskKind>>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: AggregatedReply,
}

/// Either `{message, filters}` or `{requests: [{filter, prompt}]}`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub filters: Option<Vec<TaskKind>>,
    pub requests: Option<Vec<PromptRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub message: Option<String>,
    /// Older clients send the text as `prompt`.
    pub prompt: Option<String>,
    /// Comma-separated task kinds; answered with a JSON array.
    pub filters: Option<String>,
    /// A single task kind; answered with plain text.
    pub filter: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

fn require_text(text: Option<String>, message: &str) -> Result<String, AppError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

fn require_filters(filters: Option<Vec<TaskKind>>) -> Result<Vec<TaskKind>, AppError> {
    let filters = match filters {
        Some(f) if !f.is_empty() => f,
        _ => {
            return Err(AppError::Validation(
                "Filters must be a non-empty array.".to_string(),
            ))
        }
    };
    if let Some(i) = filters.iter().position(|k| k.name().trim().is_empty()) {
        return Err(AppError::Validation(format!("Filter {i} has no name.")));
    }
    Ok(filters)
}

fn validate_batch(requests: &[PromptRequest]) -> Result<(), AppError> {
    if requests.is_empty() {
        return Err(AppError::Validation(
            "Requests must be a non-empty array.".to_string(),
        ));
    }
    for (i, request) in requests.iter().enumerate() {
        if request.kind.name().trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Request {i} is missing a filter."
            )));
        }
        if request.text.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Request {i} is missing a prompt."
            )));
        }
    }
    Ok(())
}

fn split_filters(raw: &str) -> Vec<TaskKind> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(TaskKind::parse)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/gemini
///
/// One combined call covering every requested task, answered as a JSON object.
/// No tasks means conversation-practice mode.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(request) = payload?;
    let prompt = require_text(request.prompt, "Input text is required.")?;
    let tasks = request.tasks.unwrap_or_default();

    info!("Aggregated request with {} task(s)", tasks.len());

    let response = dispatch_aggregated(state.llm.as_ref(), &prompt, &tasks).await?;

    Ok(Json(AskResponse { response }))
}

/// POST /api/chat
///
/// One concurrent call per filter. Failed filters carry a placeholder; the request still succeeds.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Vec<FilterResult>>, AppError> {
    let Json(request) = payload?;

    if let Some(requests) = request.requests {
        validate_batch(&requests)?;
        info!("Batch request with {} entries", requests.len());
        let results = dispatch_requests(state.llm.as_ref(), requests).await;
        return Ok(Json(results));
    }

    let message = require_text(request.message, "Message is required.")?;
    let filters = require_filters(request.filters)?;

    info!("Chat request with {} filter(s)", filters.len());

    let results = dispatch_per_task(state.llm.as_ref(), &message, filters).await;
    Ok(Json(results))
}

/// GET /api/chat?message=..&filters=A,B  → JSON array
/// GET /api/chat?message=..&filter=A     → plain text
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_chat_query(
    State(state): State<AppState>,
    query: Result<Query<ChatQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let message = require_text(query.message.or(query.prompt), "Message is required.")?;

    if let Some(raw) = query.filters {
        let filters = require_filters(Some(split_filters(&raw)))?;
        info!("Chat query with {} filter(s)", filters.len());
        let results = dispatch_per_task(state.llm.as_ref(), &message, filters).await;
        return Ok(Json(results).into_response());
    }

    let filter = require_text(query.filter, "A filter is required.")?;
    let text = dispatch_single(state.llm.as_ref(), TaskKind::parse(filter.trim()), &message).await?;
    Ok(text.into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
