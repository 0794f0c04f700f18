use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Everything that can go wrong while extracting links from a page.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("❌ Missing \"url\" field in JSON")]
    MissingUrl,

    #[error("❌ \"url\" field must be a string")]
    UrlNotString,

    #[error("❌ Failed to fetch page, status: {0}")]
    UpstreamStatus(u16),

    #[error(transparent)]
    Fetch(#[from] reqwest::Error),
}

impl ExtractError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingUrl | Self::UrlNotString => StatusCode::BAD_REQUEST,
            Self::UpstreamStatus(_) | Self::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client. Transport errors include their source chain,
    /// since reqwest's top-level message alone rarely names the cause.
    pub fn message(&self) -> String {
        match self {
            Self::Fetch(error) => {
                let mut message = error.to_string();
                let mut source = std::error::Error::source(error);
                while let Some(cause) = source {
                    message.push_str(": ");
                    message.push_str(&cause.to_string());
                    source = cause.source();
                }
                message
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
