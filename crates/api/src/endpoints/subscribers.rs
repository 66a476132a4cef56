//! Subscriber endpoints: subscribe, verify, unsubscribe.

use axum::{Json, Router, extract::State, routing::post};
use quillpost_common::AppResult;
use quillpost_core::SubscribeRequest;
use quillpost_db::entities::subscriber;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Simple message payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Start a subscription and email a verification code.
async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.subscriber_service.subscribe(request).await?;
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

/// A subscriber as the caller sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberResponse {
    pub email: String,
    pub name: String,
    pub verified: bool,
}

impl From<subscriber::Model> for SubscriberResponse {
    fn from(s: subscriber::Model) -> Self {
        Self {
            email: s.email,
            name: s.name,
            verified: s.verified,
        }
    }
}

/// Confirm the subscription with the emailed code.
async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> AppResult<ApiResponse<SubscriberResponse>> {
    let updated = state
        .subscriber_service
        .verify(&request.email, &request.code)
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Unsubscribe request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeRequest {
    pub email: String,
}

/// Unsubscribe an address.
async fn unsubscribe(
    State(state): State<AppState>,
    Json(request): Json<UnsubscribeRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.subscriber_service.unsubscribe(&request.email).await?;
    Ok(ApiResponse::ok(MessageResponse {
        message: "Unsubscribed".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/verify", post(verify))
        .route("/unsubscribe", post(unsubscribe))
}
