//! REST API module.
//!
//! Every handler answers with the `{success, data}` envelope; failures go
//! through [`AppError`]'s response conversion.

mod content;
mod featured;
mod session;
mod tours;
mod weather;

pub use content::*;
pub use featured::*;
pub use session::*;
pub use tours::*;
pub use weather::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::sync::ReconcileReport;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// A list as stored after a full-list save.
#[derive(Debug, Serialize)]
pub struct SavedList<T: Serialize> {
    pub items: Vec<T>,
    /// Step-by-step outcome when the save went through table reconciliation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReconcileReport>,
}
