//! Error types for model construction, lookup, and persistence.
//!
//! Construction-time errors (missing declarations, unknown kinds, malformed
//! field entries) are fatal to that model type and propagate to whatever
//! triggered type creation. Form and registry lookups are ordinary
//! recoverable errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while building or using model types
#[derive(Debug, Error)]
pub enum ModelError {
    /// Declaration file missing
    #[error("declaration not found: {path}")]
    DeclarationNotFound { path: PathBuf },

    /// A declaration field entry without a name
    #[error("nameless field in declaration for model '{model}'")]
    NamelessField { model: String },

    /// Unknown form or subform name
    #[error("form not found: {form} for model '{model}'")]
    FormNotFound { form: String, model: String },

    /// A declared form naming a field the declaration does not carry
    #[error("form '{form}' references undeclared field '{field}' in model '{model}'")]
    UnknownFormField {
        form: String,
        field: String,
        model: String,
    },

    /// Lookup of an unregistered model name
    #[error("model not registered: {name}")]
    ModelNotRegistered { name: String },

    /// No template registered for a render mode
    #[error("render mode not found: {mode}")]
    RenderModeNotFound { mode: String },

    /// Template parse or render failure
    #[error("template error: {0}")]
    Template(String),

    /// Document store failure
    #[error("store error: {0}")]
    Store(String),

    /// Field or widget kind resolution/construction failure
    #[error(transparent)]
    Fields(#[from] formgear_fields::FieldsError),

    /// Malformed declaration YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_not_found_display() {
        let err = ModelError::DeclarationNotFound {
            path: PathBuf::from("schemas/order.yaml"),
        };
        assert_eq!(err.to_string(), "declaration not found: schemas/order.yaml");
    }

    #[test]
    fn form_not_found_display() {
        let err = ModelError::FormNotFound {
            form: "quick".into(),
            model: "order".into(),
        };
        assert!(err.to_string().contains("quick"));
        assert!(err.to_string().contains("order"));
    }

    #[test]
    fn fields_error_passes_through() {
        let err: ModelError = formgear_fields::FieldsError::UnknownFieldKind {
            tag: "geopoint".into(),
        }
        .into();
        assert_eq!(err.to_string(), "unknown field kind: geopoint");
    }
}
