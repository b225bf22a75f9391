//! Widget descriptors and the widget kind registry.
//!
//! A widget is a rendering hint attached to a field, independent of the
//! field's value semantics. Widgets carry a kind tag plus arbitrary
//! pass-through options for the template layer.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{FieldsError, Result};

/// A rendering hint attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub kind: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl Widget {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: Map::new(),
        }
    }

    pub fn with_options(kind: impl Into<String>, options: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            options,
        }
    }
}

/// Constructor for a widget kind. Accepts arbitrary keyword options.
pub type WidgetConstructor = Box<dyn Fn(Map<String, Value>) -> Result<Widget> + Send + Sync>;

/// Name → constructor lookup for widget kinds, extensible by third parties.
pub struct WidgetRegistry {
    kinds: HashMap<String, WidgetConstructor>,
}

impl WidgetRegistry {
    /// An empty registry with no widget kinds.
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// A registry seeded with the builtin widget kinds.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for tag in [
            "text", "textarea", "password", "hidden", "checkbox", "select", "radio", "datetime",
        ] {
            registry.register(tag, Box::new(move |options| Ok(Widget::with_options(tag, options))));
        }
        registry
    }

    /// Register a widget kind under a tag. Replaces any existing entry.
    pub fn register(&mut self, tag: impl Into<String>, ctor: WidgetConstructor) {
        self.kinds.insert(tag.into(), ctor);
    }

    /// Whether a tag is known to this registry.
    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// Construct a widget for a tag with the given options.
    pub fn build(&self, tag: &str, options: Map<String, Value>) -> Result<Widget> {
        let ctor = self
            .kinds
            .get(tag)
            .ok_or_else(|| FieldsError::UnknownWidgetKind { tag: tag.into() })?;
        ctor(options)
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.kinds.keys().collect();
        tags.sort();
        f.debug_struct("WidgetRegistry").field("kinds", &tags).finish()
    }
}
