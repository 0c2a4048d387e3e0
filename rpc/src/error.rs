//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gpoll_core::CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("server error: {0}")]
    Server(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl RpcError {
    fn status(&self) -> StatusCode {
        match self {
            RpcError::Core(core) => match core {
                CoreError::PollNotFound(_) => StatusCode::NOT_FOUND,
                CoreError::Unauthorized | CoreError::UnauthorizedEndPoll => StatusCode::FORBIDDEN,
                CoreError::PollNotActive
                | CoreError::PollStillOpen
                | CoreError::PollExpired
                | CoreError::AlreadyVoted
                | CoreError::InvalidNonce { .. }
                | CoreError::BatchAlreadyProcessed => StatusCode::CONFLICT,
                CoreError::InsufficientOptions { .. }
                | CoreError::TooManyOptions { .. }
                | CoreError::InvalidPollDuration { .. }
                | CoreError::InvalidOption { .. }
                | CoreError::InvalidSignature
                | CoreError::InvalidBatchSettings { .. } => StatusCode::BAD_REQUEST,
                CoreError::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "rpc request failed");
        } else {
            tracing::debug!(error = %self, "rpc request rejected");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
