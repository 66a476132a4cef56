//! Submission pipeline endpoints: start, verify, finish.

use axum::{Json, Router, extract::State, routing::post};
use quillpost_common::AppResult;
use quillpost_core::SubmissionRequest;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Start a submission: cache the draft and email a verification code.
async fn start(
    State(state): State<AppState>,
    Json(request): Json<SubmissionRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.submission_service.start(request).await?;
    Ok(ApiResponse::ok(MessageResponse {
        message: "Verification code sent to your email".to_string(),
    }))
}

/// Verify request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

/// Check the emailed verification code.
async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state
        .submission_service
        .verify(&request.email, &request.code)
        .await?;
    Ok(ApiResponse::ok(MessageResponse {
        message: "Email verified".to_string(),
    }))
}

/// Finish request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishRequest {
    pub email: String,
}

/// What the caller gets back when the submission lands in review.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResultResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
}

/// Simple message payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Turn the cached draft into a pending post.
async fn finish(
    State(state): State<AppState>,
    Json(request): Json<FinishRequest>,
) -> AppResult<ApiResponse<SubmissionResultResponse>> {
    let created = state.submission_service.finish(&request.email).await?;
    Ok(ApiResponse::ok(SubmissionResultResponse {
        id: created.id,
        slug: created.slug,
        title: created.title,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/verify", post(verify))
        .route("/finish", post(finish))
}
