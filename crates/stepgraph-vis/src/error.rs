//! Error types for the visualization API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stepgraph_model::{FormatError, GraphError};
use thiserror::Error;

use crate::player::PlayerError;
use crate::session::SessionError;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Graph text could not be parsed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A graph edit was structurally invalid
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A recording could not be started
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A layout width or height was not positive and finite
    #[error("invalid layout {name} `{value}`")]
    InvalidExtent { name: &'static str, value: f64 },

    /// The playback task is gone
    #[error(transparent)]
    Player(#[from] PlayerError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Format(_) | ApiError::Graph(_) | ApiError::InvalidExtent { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Session(SessionError::UnknownStart(_)) => StatusCode::BAD_REQUEST,
            ApiError::Session(SessionError::EmptyGraph) => StatusCode::CONFLICT,
            ApiError::Player(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }

        let body = match &self {
            ApiError::Format(err) => json!({
                "error": self.to_string(),
                "kind": err.kind.to_string(),
                "token": err.token,
                "line": err.line,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
