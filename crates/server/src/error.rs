use crate::envelope::Envelope;
use crate::negotiate::Format;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use racc::{AssetKind, RaccError};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Catalog(#[from] RaccError),

    #[error("You are being rate limited")]
    RateLimitExceeded,

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Catalog(err) => match err {
                RaccError::InvalidIndex(_) => StatusCode::BAD_REQUEST,
                RaccError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
                RaccError::AssetRead { .. }
                | RaccError::Storage(_)
                | RaccError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Message placed in the failure envelope.
    ///
    /// File and counter errors keep their details in the log and show a
    /// fixed message.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Catalog(RaccError::AssetRead {
                kind: AssetKind::Video,
                ..
            }) => "An error occurred whilst fetching video file".to_string(),
            ServerError::Catalog(RaccError::AssetRead { .. }) => {
                "An error occurred whilst fetching file".to_string()
            }
            ServerError::Catalog(RaccError::Storage(_)) => {
                "An error occurred whilst counting the request".to_string()
            }
            ServerError::NotFound => "Endpoint not found".to_string(),
            other => other.to_string(),
        }
    }

    /// Render for the negotiated format: a failure envelope for JSON
    /// clients, a bare status code for binary ones.
    pub fn negotiate(self, format: Format) -> Response {
        match format {
            Format::Json => self.into_response(),
            Format::Binary => {
                self.log();
                self.status_code().into_response()
            }
        }
    }

    fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let body = Envelope::<()>::failure(self.public_message());
        (status, body).into_response()
    }
}
