//! HTTP error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tally_node::NodeError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Node(#[from] NodeError),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::Node(NodeError::InvalidVoteCount(_)) => StatusCode::BAD_REQUEST,
            RpcError::Node(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            RpcError::Node(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, "Request failed: {self}");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_node::ballot::{Ballot, VoteForm};

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            RpcError::NotFound("party".into()).status(),
            StatusCode::NOT_FOUND
        );
        let bad_count = Ballot::from(VoteForm::default()).count().unwrap_err();
        assert_eq!(RpcError::from(bad_count).status(), StatusCode::BAD_REQUEST);
        let unavailable = NodeError::Store(tally_store_error("unavailable"));
        assert_eq!(
            RpcError::from(unavailable).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        let corrupt = NodeError::Store(tally_store_error("backend"));
        assert_eq!(
            RpcError::from(corrupt).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    fn tally_store_error(kind: &str) -> tally_store::StoreError {
        match kind {
            "unavailable" => tally_store::StoreError::Unavailable("redis down".into()),
            _ => tally_store::StoreError::Backend("bad reply".into()),
        }
    }
}
