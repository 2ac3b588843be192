use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use wire::ErrorBody;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0}")]
    Validation(&'static str),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error("{message}")]
    Failed {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    /// Replaces a raw store failure with the message the caller should see.
    pub fn during(self, message: &'static str) -> Self {
        match self {
            AppError::Store(source) => AppError::Failed { message, source },
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedPayload | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Store(source) | AppError::Failed { source, .. } => {
                error!("{self}: {source}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: match &self {
                AppError::Store(_) => "Internal error".to_string(),
                other => other.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
