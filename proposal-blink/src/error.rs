//! Error types and their HTTP representation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::dtos::{ActionError, ErrorKind, LinkErrorBody, ServerErrorBody};
use crate::indexer::IndexerError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Proposal not found")]
    ProposalNotFound,

    #[error("DAO slug not found")]
    DaoSlugNotFound,

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error("{0}")]
    InvalidLink(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ProposalNotFound | ApiError::DaoSlugNotFound | ApiError::InvalidLink(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Indexer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match self {
            ApiError::ProposalNotFound | ApiError::DaoSlugNotFound => (
                status,
                Json(ActionError {
                    kind: ErrorKind::Error,
                    message,
                }),
            )
                .into_response(),
            ApiError::Indexer(_) => (status, Json(ServerErrorBody { message })).into_response(),
            ApiError::InvalidLink(_) => (status, Json(LinkErrorBody { error: message })).into_response(),
        }
    }
}
