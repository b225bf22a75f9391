//! The `Field` trait and the state shared by every field kind.
//!
//! A field is a named, typed value slot with a widget, a validation
//! predicate, and a persistence projection. Prototypes live on a model
//! type; `reinstance()` produces the independent per-instance copies.

use serde_json::{Map, Value};
use tracing::debug;

use crate::widget::Widget;

/// A typed, stateful value container with an attached widget.
///
/// Kind-specific behavior lives in the implementations: coercion in
/// `set_value`, the validation predicate, and the persisted projection.
pub trait Field: std::fmt::Debug + Send + Sync {
    /// The kind tag this field was constructed under.
    fn kind(&self) -> &'static str;

    /// Display caption. Presence marks the field as form-visible.
    fn title(&self) -> Option<&str>;

    /// The attached rendering hint.
    fn widget(&self) -> &Widget;

    /// Whether a value must be present for validation to pass.
    fn required(&self) -> bool;

    /// Whether the value is immutable via the bulk-update path.
    fn locked(&self) -> bool;

    /// Lock the field against further bulk updates.
    fn lock(&mut self);

    /// The current value.
    fn value(&self) -> &Value;

    /// Set the value, applying kind-specific coercion.
    fn set_value(&mut self, value: Value);

    /// Set the value verbatim, bypassing coercion. Used when rehydrating
    /// from storage.
    fn set_raw(&mut self, value: Value);

    /// Kind-specific validation predicate. No diagnostics; the first
    /// failing field short-circuits instance validation.
    fn validate(&self) -> bool;

    /// The persisted representation. Defaults to the raw value.
    fn to_document(&self) -> Value {
        self.value().clone()
    }

    /// An independent copy suitable for a new model instance. Must not
    /// alias mutable state with the source.
    fn reinstance(&self) -> Box<dyn Field>;
}

/// State every field kind carries: caption, widget, lock flag, requiredness,
/// and the current value.
#[derive(Debug, Clone)]
pub struct FieldCommon {
    pub title: Option<String>,
    pub required: bool,
    pub widget: Widget,
    pub locked: bool,
    pub value: Value,
}

impl FieldCommon {
    /// Consume the shared declaration options (`title`, `required`,
    /// `default`) out of a pass-through option map. The declared default
    /// becomes the initial value; the caller coerces it.
    pub fn from_options(widget: Widget, options: &mut Map<String, Value>) -> Self {
        let title = options
            .remove("title")
            .and_then(|v| v.as_str().map(str::to_owned));
        let required = options
            .remove("required")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let value = options.remove("default").unwrap_or(Value::Null);
        Self {
            title,
            required,
            widget,
            locked: false,
            value,
        }
    }
}

/// Log any declaration options a field kind did not recognize.
pub(crate) fn note_leftover_options(kind: &str, options: &Map<String, Value>) {
    if !options.is_empty() {
        let keys: Vec<_> = options.keys().cloned().collect();
        debug!(kind, ?keys, "ignoring unrecognized field options");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_options_consumes_shared_keys() {
        let mut options = Map::new();
        options.insert("title".into(), json!("Status"));
        options.insert("required".into(), json!(true));
        options.insert("default".into(), json!("open"));
        options.insert("min".into(), json!(3));

        let common = FieldCommon::from_options(Widget::new("text"), &mut options);
        assert_eq!(common.title.as_deref(), Some("Status"));
        assert!(common.required);
        assert_eq!(common.value, json!("open"));
        assert!(!common.locked);

        // Kind-specific options stay behind
        assert_eq!(options.len(), 1);
        assert!(options.contains_key("min"));
    }

    #[test]
    fn from_options_defaults() {
        let mut options = Map::new();
        let common = FieldCommon::from_options(Widget::new("text"), &mut options);
        assert!(common.title.is_none());
        assert!(!common.required);
        assert_eq!(common.value, Value::Null);
    }
}
