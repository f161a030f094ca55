//! Admin login and logout.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth::{session_token, Credentials};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
}

/// POST /api/session - Log in.
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> ApiResult<SessionInfo> {
    if !state.auth.verify(&credentials) {
        tracing::warn!("Rejected admin login for {:?}", credentials.username);
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let session_id = state.sessions.create().await;
    tracing::info!("Admin {:?} logged in", credentials.username);
    success(SessionInfo { session_id })
}

/// DELETE /api/session - Log out.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token).await;
    }
    success(())
}
