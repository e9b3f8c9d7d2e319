use thiserror::Error;

use super::request::MAX_PREFIX_LEN;

/// Input rejected before any cache or engine work happens.
///
/// The `Display` output is the exact message returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Body parameter '{field}' must be a string")]
    BodyParameter { field: &'static str },
    #[error("Query parameter '{field}' must be a string")]
    QueryParameter { field: &'static str },
    #[error("Prefix too long! Max allowed is {max}", max = MAX_PREFIX_LEN)]
    PrefixTooLong,
    #[error("Request body must be valid JSON")]
    MalformedBody { reason: String },
}

impl ValidationError {
    pub fn body_parameter(field: &'static str) -> Self {
        Self::BodyParameter { field }
    }

    pub fn query_parameter(field: &'static str) -> Self {
        Self::QueryParameter { field }
    }

    pub fn malformed_body(reason: impl Into<String>) -> Self {
        Self::MalformedBody {
            reason: reason.into(),
        }
    }

    /// Name of the offending field, when the error concerns a single one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::BodyParameter { field } | Self::QueryParameter { field } => Some(field),
            Self::PrefixTooLong => Some("prefix"),
            Self::MalformedBody { .. } => None,
        }
    }
}
