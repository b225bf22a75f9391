//! Error types for the field and widget registries

use thiserror::Error;

/// Result type for field operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while resolving or constructing fields and widgets
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Unknown field kind tag during resolution
    #[error("unknown field kind: {tag}")]
    UnknownFieldKind { tag: String },

    /// Unknown widget kind tag during resolution
    #[error("unknown widget kind: {tag}")]
    UnknownWidgetKind { tag: String },

    /// Construction options did not fit the field kind
    #[error("invalid options for {kind} field: {message}")]
    InvalidOptions { kind: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_field_kind_display() {
        let err = FieldsError::UnknownFieldKind {
            tag: "geopoint".into(),
        };
        assert_eq!(err.to_string(), "unknown field kind: geopoint");
    }

    #[test]
    fn invalid_options_display() {
        let err = FieldsError::InvalidOptions {
            kind: "select".into(),
            message: "choices must be a list".into(),
        };
        assert!(err.to_string().contains("select"));
        assert!(err.to_string().contains("choices must be a list"));
    }
}
