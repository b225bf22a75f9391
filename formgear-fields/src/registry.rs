//! Name → constructor lookup for field kinds.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{FieldsError, Result};
use crate::field::Field;
use crate::kinds;
use crate::widget::Widget;

/// Constructor for a field kind: the resolved widget instance plus the
/// remaining pass-through declaration options.
pub type FieldConstructor =
    Box<dyn Fn(Widget, Map<String, Value>) -> Result<Box<dyn Field>> + Send + Sync>;

/// A registered field kind: its default widget tag and its constructor.
pub struct FieldKind {
    pub default_widget: String,
    pub construct: FieldConstructor,
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldKind")
            .field("default_widget", &self.default_widget)
            .finish_non_exhaustive()
    }
}

impl FieldKind {
    pub fn new(default_widget: impl Into<String>, construct: FieldConstructor) -> Self {
        Self {
            default_widget: default_widget.into(),
            construct,
        }
    }
}

/// Name → constructor lookup for field kinds, extensible by third parties.
pub struct FieldRegistry {
    kinds: HashMap<String, FieldKind>,
}

impl FieldRegistry {
    /// An empty registry with no field kinds.
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// A registry seeded with the builtin kinds.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("string", FieldKind::new("text", Box::new(kinds::string)));
        registry.register("number", FieldKind::new("text", Box::new(kinds::number)));
        registry.register(
            "boolean",
            FieldKind::new("checkbox", Box::new(kinds::boolean)),
        );
        registry.register(
            "datetime",
            FieldKind::new("datetime", Box::new(kinds::datetime)),
        );
        registry.register("select", FieldKind::new("select", Box::new(kinds::select)));
        registry
    }

    /// Register a field kind under a tag. Replaces any existing entry.
    pub fn register(&mut self, tag: impl Into<String>, kind: FieldKind) {
        self.kinds.insert(tag.into(), kind);
    }

    /// Whether a tag is known to this registry.
    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// Resolve a tag to its registered kind.
    pub fn resolve(&self, tag: &str) -> Result<&FieldKind> {
        self.kinds
            .get(tag)
            .ok_or_else(|| FieldsError::UnknownFieldKind { tag: tag.into() })
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.kinds.keys().collect();
        tags.sort();
        f.debug_struct("FieldRegistry").field("kinds", &tags).finish()
    }
}
