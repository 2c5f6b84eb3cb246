use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::web::models::ErrorResponse;

/// Failures surfaced to the caller of `/chat`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Model not allowed")]
    ModelNotAllowed,

    #[error("Invalid workshop code")]
    InvalidWorkshopCode,

    #[error("Message too large")]
    MessageTooLarge,

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("{0}")]
    InvalidBody(String),

    #[error("Upstream model request failed")]
    Upstream(#[source] anyhow::Error),

    #[error("Upstream model request timed out")]
    UpstreamTimeout,
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ModelNotAllowed => StatusCode::BAD_REQUEST,
            Self::InvalidWorkshopCode => StatusCode::UNAUTHORIZED,
            Self::MessageTooLarge | Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            detail: self.to_string(),
        })
    }
}
