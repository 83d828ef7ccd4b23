//! `/api/summarize` handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::server::error::ApiError;
use crate::server::validation::{
    is_summary_id, Validator, MAX_EDIT_CHARS, MAX_PROMPT_CHARS, MAX_TEXT_CHARS, MAX_TITLE_CHARS,
    MIN_PROMPT_CHARS, MIN_TEXT_CHARS, MIN_TITLE_CHARS,
};
use crate::server::AppState;
use crate::storage::{Summary, SummaryEdit};
use crate::PrecisError;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateSummaryBody {
    pub original_text: Option<String>,
    pub custom_prompt: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditSummaryBody {
    pub edited_summary: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Value>,
}

/// Raw paging parameters; anything unparsable or non-positive uses defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    fn number(value: &Option<String>) -> usize {
        value
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(0)
    }
}

/// Full record plus the derived final text
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    final_summary: &'a str,
}

impl<'a> SummaryDetail<'a> {
    fn new(summary: &'a Summary) -> Self {
        Self {
            summary,
            final_summary: summary.final_summary(),
        }
    }
}

/// POST /api/summarize
pub async fn create_summary(
    State(state): State<AppState>,
    payload: Result<Json<CreateSummaryBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;

    let mut v = Validator::new();
    let text = v.required_text(
        "originalText",
        body.original_text.as_deref(),
        "Original text",
        MIN_TEXT_CHARS,
        MAX_TEXT_CHARS,
    );
    let prompt = v.required_text(
        "customPrompt",
        body.custom_prompt.as_deref(),
        "Custom prompt",
        MIN_PROMPT_CHARS,
        MAX_PROMPT_CHARS,
    );
    let title = v.required_text(
        "title",
        body.title.as_deref(),
        "Title",
        MIN_TITLE_CHARS,
        MAX_TITLE_CHARS,
    );
    let tags = v.tags("tags", body.tags.as_ref()).unwrap_or_default();
    v.finish().map_err(ApiError::validation)?;

    let (Some(text), Some(prompt), Some(title)) = (text, prompt, title) else {
        return Err(ApiError::bad_request("Validation failed"));
    };

    const ACTION: &str = "Failed to generate summary";

    let outcome = state
        .summarizer
        .summarize(text, prompt)
        .await
        .map_err(|e| ApiError::from_error(ACTION, e.into()))?;

    let summary = Summary::new(
        title.to_string(),
        text.to_string(),
        prompt.to_string(),
        outcome.text,
    )
    .with_tags(tags);

    let summary = state
        .repo
        .create_summary(summary)
        .await
        .map_err(|e| ApiError::from_error(ACTION, e.into()))?;

    info!("Summary generated and saved: {} ({:?})", summary.id, outcome.source);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "id": summary.id,
                "title": summary.title,
                "generatedSummary": summary.generated_summary,
                "finalSummary": summary.final_summary(),
                "tags": summary.tags,
                "summarySource": outcome.source,
                "createdAt": summary.created_at,
            }
        })),
    ))
}

/// GET /api/summarize/:id
pub async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let summary = find_summary(&state, &id)
        .await
        .map_err(|e| ApiError::from_error("Failed to fetch summary", e))?;

    Ok(Json(json!({
        "success": true,
        "data": SummaryDetail::new(&summary),
    })))
}

/// PUT /api/summarize/:id
pub async fn update_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EditSummaryBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;

    let mut v = Validator::new();
    let edited = v.required_text(
        "editedSummary",
        body.edited_summary.as_deref(),
        "Edited summary",
        1,
        MAX_EDIT_CHARS,
    );
    let title = v.optional_text(
        "title",
        body.title.as_deref(),
        "Title",
        MIN_TITLE_CHARS,
        MAX_TITLE_CHARS,
    );
    let tags = v.tags("tags", body.tags.as_ref());
    v.finish().map_err(ApiError::validation)?;

    let Some(edited) = edited else {
        return Err(ApiError::bad_request("Validation failed"));
    };

    if !is_summary_id(&id) {
        return Err(ApiError::summary_not_found());
    }

    let edit = SummaryEdit {
        edited_summary: edited.to_string(),
        title: title.map(str::to_string),
        tags,
    };

    let summary = state
        .repo
        .edit_summary(&id, edit)
        .await
        .map_err(|e| ApiError::internal("Failed to update summary", e))?
        .ok_or_else(ApiError::summary_not_found)?;

    info!("Summary updated: {}", summary.id);

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": summary.id,
            "title": summary.title,
            "generatedSummary": summary.generated_summary,
            "editedSummary": summary.edited_summary,
            "finalSummary": summary.final_summary(),
            "tags": summary.tags,
            "updatedAt": summary.updated_at,
        }
    })))
}

/// GET /api/summarize
pub async fn list_summaries(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let page = ListParams::number(&params.page);
    let limit = ListParams::number(&params.limit);
    debug!(page, limit, "Listing summaries");

    let page = state
        .repo
        .list_page(page, limit)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch summaries", e))?;

    Ok(Json(json!({
        "success": true,
        "data": page.items,
        "pagination": page.pagination,
    })))
}

/// DELETE /api/summarize/:id
pub async fn delete_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !is_summary_id(&id) {
        return Err(ApiError::summary_not_found());
    }

    let deleted = state
        .repo
        .delete_summary(&id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete summary", e))?;

    if !deleted {
        return Err(ApiError::summary_not_found());
    }

    info!("Summary deleted: {}", id);

    Ok(Json(json!({
        "success": true,
        "message": "Summary deleted successfully",
    })))
}

/// POST /api/summarize/test-ai
pub async fn test_ai(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let result = state.summarizer.test_connection().await;

    if result.success {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "AI service is working correctly",
                "response": result.response,
            })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": "AI service connection failed",
                "details": result.error,
            })),
        )
    }
}

/// Look up a summary, treating malformed ids as unknown
pub(crate) async fn find_summary(state: &AppState, id: &str) -> Result<Summary, PrecisError> {
    if !is_summary_id(id) {
        return Err(PrecisError::NotFound(id.to_string()));
    }

    state
        .repo
        .get_summary(id)
        .await?
        .ok_or_else(|| PrecisError::NotFound(id.to_string()))
}
