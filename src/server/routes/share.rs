//! `/api/share` handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::mail::{format, is_valid_address, normalize_address, validate_addresses, MailError};
use crate::server::error::ApiError;
use crate::server::routes::summarize::find_summary;
use crate::server::validation::{is_summary_id, Validator};
use crate::server::AppState;
use crate::PrecisError;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareBody {
    pub summary_id: Option<String>,
    pub recipients: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestEmailBody {
    pub test_email: Option<String>,
}

/// POST /api/share
pub async fn share_summary(
    State(state): State<AppState>,
    payload: Result<Json<ShareBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;

    let summary_id = body.summary_id.unwrap_or_default();
    let recipients: Vec<String> = match &body.recipients {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().unwrap_or_default().to_string())
            .collect(),
        _ => Vec::new(),
    };

    let mut v = Validator::new();
    v.check(!summary_id.is_empty(), "summaryId", "Summary ID is required");
    v.check(
        summary_id.is_empty() || is_summary_id(&summary_id),
        "summaryId",
        "Invalid summary ID",
    );
    v.check(
        !recipients.is_empty(),
        "recipients",
        "At least one recipient email is required",
    );
    v.finish().map_err(ApiError::validation)?;

    const ACTION: &str = "Failed to share summary";

    let summary = find_summary(&state, &summary_id)
        .await
        .map_err(|e| ApiError::from_error(ACTION, e))?;

    let check = validate_addresses(&recipients);
    if !check.invalid.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            json!({
                "error": "Invalid email addresses found",
                "invalidEmails": check.invalid,
            }),
        ));
    }

    let mailer = state
        .mailer
        .as_ref()
        .ok_or_else(|| ApiError::from_error(ACTION, MailError::NotConfigured.into()))?;

    info!("Sending summary {} via email to {:?}", summary.id, check.valid);
    let receipt = mailer
        .send_summary(&check.valid, summary.final_summary(), &summary.title)
        .await
        .map_err(|e| ApiError::from_error(ACTION, e.into()))?;

    let records = state
        .repo
        .record_shares(&summary.id, &check.valid)
        .await
        .map_err(|e| ApiError::from_error(ACTION, e.into()))?;

    info!("Summary shared successfully: {}", summary.id);

    let shared_at = records.first().map(|r| r.shared_at).unwrap_or_else(Utc::now);

    Ok(Json(json!({
        "success": true,
        "message": "Summary shared successfully",
        "data": {
            "summaryId": summary.id,
            "recipients": check.valid,
            "sharedAt": shared_at,
            "messageId": receipt.message_id,
        }
    })))
}

/// GET /api/share/history/:summary_id
pub async fn share_history(
    State(state): State<AppState>,
    Path(summary_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !is_summary_id(&summary_id) {
        return Err(ApiError::bad_request("Invalid summary ID format"));
    }

    let summary = find_summary(&state, &summary_id)
        .await
        .map_err(|e| ApiError::from_error("Failed to fetch share history", e))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "summaryId": summary.id,
            "title": summary.title,
            "isShared": summary.is_shared,
            "shareHistory": summary.shared_with,
            "totalShares": summary.shared_with.len(),
            "uniqueRecipients": summary.unique_recipients(),
        }
    })))
}

/// POST /api/share/test-email
pub async fn test_email(
    State(state): State<AppState>,
    payload: Result<Json<TestEmailBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let recipient = body.test_email.as_deref().map(normalize_address).unwrap_or_default();

    let mut v = Validator::new();
    v.check(
        is_valid_address(&recipient),
        "testEmail",
        "Valid test email is required",
    );
    v.finish().map_err(ApiError::validation)?;

    let verified = match &state.mailer {
        Some(mailer) => mailer.verify().await.map(|_| mailer),
        None => Err(MailError::NotConfigured),
    };
    let mailer = verified.map_err(|e| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({
                "success": false,
                "error": "Email service connection failed",
                "details": e.to_string(),
            }),
        )
    })?;

    let sent_at = Utc::now();
    let text = format::test_message(&recipient, sent_at);

    let receipt = mailer
        .send_summary(std::slice::from_ref(&recipient), &text, format::TEST_TITLE)
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "error": "Failed to send test email",
                    "message": e.to_string(),
                }),
            )
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Test email sent successfully",
        "data": {
            "recipient": recipient,
            "messageId": receipt.message_id,
            "sentAt": sent_at,
        }
    })))
}

/// GET /api/share/stats
pub async fn share_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let totals = state
        .repo
        .share_totals()
        .await
        .map_err(|e| ApiError::from_error("Failed to fetch sharing statistics", PrecisError::from(e)))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "totalSummaries": totals.total_summaries,
            "sharedSummaries": totals.shared_summaries,
            "unsharedSummaries": totals.unshared_summaries(),
            "shareRate": totals.share_rate(),
            "totalShares": totals.total_shares,
            "uniqueRecipients": totals.unique_recipients,
            "averageSharesPerSummary": totals.average_shares_per_summary(),
        }
    })))
}
