use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error as ThisError;
use uuid::Uuid;

use crate::core::models::application::ApplicationStatus;
use crate::core::saga::Step;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("http client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("application not found: {0}")]
    ApplicationNotFound(Uuid),

    #[error("profile not found for user {0}")]
    ProfileNotFound(Uuid),

    #[error("application {id} has already been {status}")]
    InvalidTransition { id: Uuid, status: ApplicationStatus },

    #[error("failed to {step}: {source}")]
    StepFailed {
        step: Step,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to {0}: timed out")]
    StepTimeout(Step),

    #[error("notification error: {0}")]
    NotificationError(String),

    #[error("code host error: {0}")]
    CodeHostError(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("server error: {0}")]
    ServerError(String),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::ApplicationNotFound(_) | Error::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidTransition { .. } => StatusCode::CONFLICT,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
