//! Form definitions and form views.
//!
//! A form is a named, ordered subset of a model type's fields. Every model
//! type carries its declared forms plus a synthesized `default` form built
//! from the titled fields in declaration order. A `FormView` binds the form
//! list to a field catalog — the type's prototypes or an instance's own
//! fields — and resolves `(name, field)` pairs for rendering.

use indexmap::IndexMap;
use tracing::warn;

use formgear_fields::Field;

use crate::error::{ModelError, Result};

/// A named, ordered list of field names.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDef {
    pub name: String,
    pub fields: Vec<String>,
}

impl FormDef {
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// The forms declared on a model type, scanned in order.
///
/// The synthesized `default` form is appended after the declared forms, so
/// an explicitly declared `default` shadows it.
#[derive(Debug, Clone)]
pub struct FormSet {
    forms: Vec<FormDef>,
}

impl FormSet {
    pub(crate) fn build(declared: Vec<FormDef>, default_fields: Vec<String>) -> Self {
        let mut forms = declared;
        forms.push(FormDef::new("default", default_fields));
        Self { forms }
    }

    /// Look up a form by name; `None` or empty means `default`.
    pub fn get(&self, name: Option<&str>) -> Option<&FormDef> {
        let name = match name {
            Some(n) if !n.is_empty() => n,
            _ => "default",
        };
        self.forms.iter().find(|form| form.name == name)
    }

    /// Whether a form with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.forms.iter().any(|form| form.name == name)
    }

    /// All forms in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &FormDef> {
        self.forms.iter()
    }
}

/// A form list bound to an owner's field catalog.
#[derive(Debug, Clone, Copy)]
pub struct FormView<'a> {
    forms: &'a FormSet,
    fields: &'a IndexMap<String, Box<dyn Field>>,
    model: &'a str,
}

impl<'a> FormView<'a> {
    pub(crate) fn new(
        forms: &'a FormSet,
        fields: &'a IndexMap<String, Box<dyn Field>>,
        model: &'a str,
    ) -> Self {
        Self {
            forms,
            fields,
            model,
        }
    }

    /// Look up a form by name; `None` or empty means `default`. Unknown
    /// names surface as `FormNotFound`.
    pub fn get(&self, name: Option<&str>) -> Result<&'a FormDef> {
        self.forms.get(name).ok_or_else(|| ModelError::FormNotFound {
            form: name.unwrap_or("default").to_string(),
            model: self.model.to_string(),
        })
    }

    /// Look up a field in the owner's catalog.
    pub fn field(&self, name: &str) -> Option<&'a dyn Field> {
        self.fields.get(name).map(|f| f.as_ref())
    }

    /// Resolve a form (or an explicit field-name override) to ordered
    /// `(name, field)` pairs from the owner's catalog. Names the owner
    /// does not carry are skipped with a warning — instance catalogs
    /// bound to a subform legitimately hold only a subset of the type's
    /// fields. Declared forms are checked against the full catalog when
    /// the type is built.
    pub fn resolve(
        &self,
        name: Option<&str>,
        override_fields: Option<&[String]>,
    ) -> Result<Vec<(&'a str, &'a dyn Field)>> {
        let names: &[String] = match override_fields {
            Some(fields) if !fields.is_empty() => fields,
            _ => &self.get(name)?.fields,
        };

        let mut resolved = Vec::with_capacity(names.len());
        for field_name in names {
            match self.fields.get_key_value(field_name.as_str()) {
                Some((key, field)) => resolved.push((key.as_str(), field.as_ref())),
                None => {
                    warn!(model = self.model, field = %field_name, "form references field missing from catalog");
                }
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgear_fields::{Widget, kinds};
    use serde_json::{json, Map, Value};

    fn catalog(names: &[(&str, Option<&str>)]) -> IndexMap<String, Box<dyn Field>> {
        let mut fields = IndexMap::new();
        for (name, title) in names {
            let mut options = Map::new();
            if let Some(title) = title {
                options.insert("title".into(), Value::String(title.to_string()));
            }
            let field = kinds::string(Widget::new("text"), options).unwrap();
            fields.insert(name.to_string(), field);
        }
        fields
    }

    #[test]
    fn default_is_always_present() {
        let set = FormSet::build(Vec::new(), vec!["status".into()]);
        let form = set.get(None).unwrap();
        assert_eq!(form.name, "default");
        assert_eq!(form.fields, vec!["status".to_string()]);
    }

    #[test]
    fn empty_name_means_default() {
        let set = FormSet::build(Vec::new(), vec!["status".into()]);
        assert!(set.get(Some("")).is_some());
    }

    #[test]
    fn declared_default_shadows_synthesized() {
        let declared = vec![FormDef::new("default", vec!["total".into()])];
        let set = FormSet::build(declared, vec!["status".into()]);
        assert_eq!(set.get(Some("default")).unwrap().fields, vec!["total".to_string()]);
    }

    #[test]
    fn view_resolves_in_order() {
        let fields = catalog(&[("status", Some("Status")), ("total", None)]);
        let set = FormSet::build(
            vec![FormDef::new("full", vec!["total".into(), "status".into()])],
            vec!["status".into()],
        );
        let view = FormView::new(&set, &fields, "order");

        let resolved = view.resolve(Some("full"), None).unwrap();
        let names: Vec<_> = resolved.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["total", "status"]);
    }

    #[test]
    fn view_override_wins_over_form() {
        let fields = catalog(&[("status", Some("Status")), ("total", None)]);
        let set = FormSet::build(Vec::new(), vec!["status".into()]);
        let view = FormView::new(&set, &fields, "order");

        let override_fields = vec!["total".to_string()];
        let resolved = view.resolve(None, Some(&override_fields)).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0, "total");
    }

    #[test]
    fn unknown_form_is_form_not_found() {
        let fields = catalog(&[("status", Some("Status"))]);
        let set = FormSet::build(Vec::new(), vec!["status".into()]);
        let view = FormView::new(&set, &fields, "order");

        let err = view.resolve(Some("missing"), None).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FormNotFound { form, model } if form == "missing" && model == "order"
        ));
    }

    #[test]
    fn missing_catalog_fields_skipped() {
        let fields = catalog(&[("status", Some("Status"))]);
        let set = FormSet::build(
            vec![FormDef::new("wide", vec!["status".into(), "gone".into()])],
            vec!["status".into()],
        );
        let view = FormView::new(&set, &fields, "order");

        let resolved = view.resolve(Some("wide"), None).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0, "status");
    }

    #[test]
    fn view_field_lookup() {
        let fields = catalog(&[("status", Some("Status"))]);
        let set = FormSet::build(Vec::new(), vec!["status".into()]);
        let view = FormView::new(&set, &fields, "order");

        assert_eq!(view.field("status").unwrap().value(), &json!(null));
        assert!(view.field("gone").is_none());
    }
}
