use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{
        render::{ComputeError, EngineInitError},
        theme::FetchError,
    },
    cache::CacheAsideError,
    domain::error::ValidationError,
    infra::error::InfraError,
};

/// Structured description of a failed request, attached to the response for logging.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to fetch theme: {0}")]
    UpstreamFetch(#[from] FetchError),
    #[error("Failed to generate theme CSS: {0}")]
    ThemeCss(ComputeError),
    #[error("Failed to highlight code: {0}")]
    Highlight(ComputeError),
    #[error(transparent)]
    Engine(#[from] EngineInitError),
    #[error(transparent)]
    Cache(#[from] CacheAsideError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::UpstreamFetch(_)
            | AppError::ThemeCss(_)
            | AppError::Highlight(_) => StatusCode::BAD_REQUEST,
            AppError::Engine(_)
            | AppError::Cache(_)
            | AppError::Infra(_)
            | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client. Client errors carry the message verbatim.
    fn presentation_message(&self) -> String {
        if self.status_code().is_client_error() {
            self.to_string()
        } else {
            format!("Internal error: {self}")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.presentation_message();
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = (status, message).into_response();
        report.attach(&mut response);
        response
    }
}
