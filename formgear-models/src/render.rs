//! Liquid-backed form rendering.
//!
//! The renderer holds one compiled template per render mode (`edit`,
//! `view`, ...). A template sees the resolved fields as an ordered `form`
//! array of objects `{name, value, title, required, locked, widget}`, plus
//! whatever extra context the caller merges in.

use std::collections::HashMap;

use liquid::{Object, Parser, ParserBuilder, Template};
use serde_json::json;

use formgear_fields::Field;

use crate::error::{ModelError, Result};

/// Template provider for form rendering, keyed by render mode.
pub struct FormRenderer {
    parser: Parser,
    modes: HashMap<String, Template>,
}

impl FormRenderer {
    pub fn new() -> Result<Self> {
        let parser = ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| ModelError::Template(e.to_string()))?;
        Ok(Self {
            parser,
            modes: HashMap::new(),
        })
    }

    /// Compile and register the template for a render mode. Replaces any
    /// existing template for that mode.
    pub fn register_mode(&mut self, mode: impl Into<String>, source: &str) -> Result<()> {
        let template = self
            .parser
            .parse(source)
            .map_err(|e| ModelError::Template(e.to_string()))?;
        self.modes.insert(mode.into(), template);
        Ok(())
    }

    /// Whether a mode has a registered template.
    pub fn has_mode(&self, mode: &str) -> bool {
        self.modes.contains_key(mode)
    }

    /// Render the mode's template over resolved `(name, field)` pairs and
    /// extra context.
    pub fn render(
        &self,
        mode: &str,
        fields: &[(&str, &dyn Field)],
        extra: &Object,
    ) -> Result<String> {
        let template = self
            .modes
            .get(mode)
            .ok_or_else(|| ModelError::RenderModeNotFound { mode: mode.into() })?;

        let form: Vec<_> = fields
            .iter()
            .map(|(name, field)| {
                json!({
                    "name": name,
                    "value": field.value(),
                    "title": field.title(),
                    "required": field.required(),
                    "locked": field.locked(),
                    "widget": field.widget(),
                })
            })
            .collect();
        let form = liquid::model::to_value(&form)
            .map_err(|e| ModelError::Template(e.to_string()))?;

        let mut globals = extra.clone();
        globals.insert("form".into(), form);

        template
            .render(&globals)
            .map_err(|e| ModelError::Template(e.to_string()))
    }
}

impl std::fmt::Debug for FormRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut modes: Vec<_> = self.modes.keys().collect();
        modes.sort();
        f.debug_struct("FormRenderer").field("modes", &modes).finish()
    }
}
