//! Ticket issuance for API clients.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use docvault_core::Principal;

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ticket: String,
}

/// Exchange caller-supplied credentials for a repository ticket.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    if body.user_id.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("missing credentials"));
    }

    let principal = Principal::new(body.user_id.trim(), body.password);
    let ticket = state.ticket_provider().authenticate(&principal).await?;
    info!(user_id = %principal.user_id, "Issued repository ticket");

    Ok(Json(LoginResponse {
        ticket: ticket.as_str().to_string(),
    }))
}
