use serde::Serialize;

/// Convenience result type used across layerpin.
pub type AvatarResult<T> = Result<T, AvatarError>;

/// One rejected field of a character description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `face.skinColor`.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Top-level error taxonomy for the compositing and publishing pipeline.
#[derive(thiserror::Error, Debug)]
pub enum AvatarError {
    /// The request violates the character schema.
    #[error("validation error: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// A non-empty layer reference could not be fetched or decoded.
    #[error("layer fetch error: {locator}: {message}")]
    LayerFetch {
        /// Locator as written in the request.
        locator: String,
        /// What went wrong.
        message: String,
    },

    /// A previously published asset could not be removed before republishing.
    #[error("replace conflict: {0}")]
    ReplaceConflict(String),

    /// The artifact store rejected or failed an upload or lookup.
    #[error("publish error: {0}")]
    Publish(String),

    /// Ephemeral staging could not be created, written or read.
    #[error("resource error: {0}")]
    Resource(String),

    /// Pixel-level processing failed (geometry, buffer sizes, encoding).
    #[error("image error: {0}")]
    Image(String),

    /// Process configuration is missing or malformed.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AvatarError {
    /// Build a [`AvatarError::Validation`] value for a single field.
    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, msg)])
    }

    /// Build a [`AvatarError::LayerFetch`] value.
    pub fn layer_fetch(locator: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::LayerFetch {
            locator: locator.into(),
            message: msg.into(),
        }
    }

    /// Build a [`AvatarError::ReplaceConflict`] value.
    pub fn replace_conflict(msg: impl Into<String>) -> Self {
        Self::ReplaceConflict(msg.into())
    }

    /// Build a [`AvatarError::Publish`] value.
    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// Build a [`AvatarError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`AvatarError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build a [`AvatarError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure is attributable to the caller's request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Map the error to the response payload returned at the request boundary.
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            Self::Validation(violations) => ErrorResponse {
                status: 400,
                detail: serde_json::to_value(violations)
                    .unwrap_or_else(|_| serde_json::Value::String(self.to_string())),
            },
            _ => ErrorResponse {
                status: 500,
                detail: serde_json::Value::String(self.to_string()),
            },
        }
    }
}

/// Error payload handed back to the caller on a hard failure.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// HTTP-style status class: 400 for client errors, 500 otherwise.
    pub status: u16,
    /// Per-field violations for validation errors, a message string otherwise.
    pub detail: serde_json::Value,
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
