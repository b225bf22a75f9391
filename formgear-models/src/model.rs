//! Model types and model instances.
//!
//! A model type is the product of the factory run: the ordered field
//! prototype catalog, the form set, and the key spec, built once from a
//! declaration. Instances select a subform, reinstance the prototypes into
//! their own catalog, and carry per-instance values, an optional stored
//! identifier, and the persistence mapping.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use liquid::Object;
use serde_json::Value;
use tracing::debug;

use formgear_fields::{Field, FieldRegistry, WidgetRegistry};

use crate::declaration::{Declaration, WidgetDecl};
use crate::error::{ModelError, Result};
use crate::forms::{FormDef, FormSet, FormView};
use crate::key::KeySpec;
use crate::registry::ModelRegistry;
use crate::render::FormRenderer;
use crate::store::{Backend, Document};

/// String form of a scalar value; `None` for null. Compound values fall
/// back to their JSON text.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Builder returned by [`ModelType::declare`]. Collects the declaration
/// source and the class-level overrides, then runs the factory.
#[derive(Debug)]
pub struct ModelTypeBuilder {
    name: String,
    path: Option<PathBuf>,
    declaration: Option<Declaration>,
    description: Option<String>,
    key: Option<KeySpec>,
}

impl ModelTypeBuilder {
    /// Load the declaration from this path at build time.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Use an already-parsed declaration. No file is required — this is
    /// how base or programmatic types are built. When a path is also set
    /// it only anchors file-relative references.
    pub fn declaration(mut self, declaration: Declaration) -> Self {
        self.declaration = Some(declaration);
        self
    }

    /// Override the declaration's description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Override the declaration's key spec.
    pub fn key(mut self, spec: KeySpec) -> Self {
        self.key = Some(spec);
        self
    }

    /// Run the factory: parse the declaration, build the field prototypes
    /// and forms, and produce the model type.
    pub fn build(
        self,
        field_registry: &FieldRegistry,
        widget_registry: &WidgetRegistry,
    ) -> Result<ModelType> {
        let mut decl = match self.declaration {
            Some(decl) => decl,
            None => match &self.path {
                Some(path) => Declaration::load(path)?,
                None => Declaration::default(),
            },
        };
        if let Some(dir) = self.path.as_ref().and_then(|p| p.parent()) {
            decl.resolve_choice_files(dir)?;
        }

        let name = self.name;
        let title = decl.title.clone().unwrap_or_else(|| name.clone());
        let description = self.description.or(decl.description).unwrap_or_default();

        let mut fields: IndexMap<String, Box<dyn Field>> = IndexMap::new();
        for field_decl in decl.fields {
            let field_name = field_decl.name.ok_or_else(|| ModelError::NamelessField {
                model: name.clone(),
            })?;
            let tag = field_decl.type_.as_deref().unwrap_or("string");
            let kind = field_registry.resolve(tag)?;

            let (widget_tag, widget_options) = match field_decl.widget {
                None => (kind.default_widget.clone(), serde_json::Map::new()),
                Some(WidgetDecl::Tag(tag)) => (tag, serde_json::Map::new()),
                Some(WidgetDecl::Spec { type_, options }) => (
                    type_.unwrap_or_else(|| kind.default_widget.clone()),
                    options,
                ),
            };
            let widget = widget_registry.build(&widget_tag, widget_options)?;

            let field = (kind.construct)(widget, field_decl.options)?;
            fields.insert(field_name, field);
        }

        // Every declared form must name declared fields; a typo here is a
        // declaration defect, fatal at type-definition time.
        for form in &decl.forms {
            for field_name in &form.fields {
                if !fields.contains_key(field_name.as_str()) {
                    return Err(ModelError::UnknownFormField {
                        form: form.name.clone(),
                        field: field_name.clone(),
                        model: name.clone(),
                    });
                }
            }
        }

        let declared_forms = decl
            .forms
            .into_iter()
            .map(|form| FormDef::new(form.name, form.fields))
            .collect();
        let default_fields = fields
            .iter()
            .filter(|(_, field)| field.title().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        let forms = FormSet::build(declared_forms, default_fields);

        let key = self.key.or(decl.key.map(KeySpec::from_decl));

        debug!(model = %name, fields = fields.len(), "model type built");
        Ok(ModelType {
            inner: Arc::new(TypeInner {
                name,
                title,
                description,
                path: self.path,
                fields,
                forms,
                key,
            }),
        })
    }

    /// Build and register in one step.
    pub fn build_registered(
        self,
        registry: &mut ModelRegistry,
        field_registry: &FieldRegistry,
        widget_registry: &WidgetRegistry,
    ) -> Result<ModelType> {
        let model = self.build(field_registry, widget_registry)?;
        registry.register(model.clone());
        Ok(model)
    }
}

#[derive(Debug)]
struct TypeInner {
    name: String,
    title: String,
    description: String,
    path: Option<PathBuf>,
    fields: IndexMap<String, Box<dyn Field>>,
    forms: FormSet,
    key: Option<KeySpec>,
}

/// A declaration-synthesized entity type: field prototypes, forms, and the
/// key spec. Cheap to clone; clones share the immutable type data.
#[derive(Debug, Clone)]
pub struct ModelType {
    inner: Arc<TypeInner>,
}

impl ModelType {
    /// Start declaring a model type under a registration name. Names are
    /// lowercased, matching how type names register.
    pub fn declare(name: &str) -> ModelTypeBuilder {
        ModelTypeBuilder {
            name: name.to_lowercase(),
            path: None,
            declaration: None,
            description: None,
            key: None,
        }
    }

    /// The registration name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The backend collection kind. Same as the registration name.
    pub fn kind(&self) -> &str {
        &self.inner.name
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    pub fn description(&self) -> &str {
        &self.inner.description
    }

    /// The declaration path, when the type was loaded from a file.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// The ordered field prototype catalog.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &dyn Field)> {
        self.inner
            .fields
            .iter()
            .map(|(n, f)| (n.as_str(), f.as_ref()))
    }

    /// A field prototype by name.
    pub fn field(&self, name: &str) -> Option<&dyn Field> {
        self.inner.fields.get(name).map(|f| f.as_ref())
    }

    /// The form set (declared forms plus the synthesized default).
    pub fn forms(&self) -> &FormSet {
        &self.inner.forms
    }

    /// A form view over the type-level prototypes.
    pub fn form(&self) -> FormView<'_> {
        FormView::new(&self.inner.forms, &self.inner.fields, &self.inner.name)
    }

    /// The key spec, if the declaration or builder supplied one.
    pub fn key_spec(&self) -> Option<&KeySpec> {
        self.inner.key.as_ref()
    }

    /// Start building an instance of this type.
    pub fn instance(&self) -> InstanceBuilder {
        InstanceBuilder {
            ty: self.clone(),
            subform: None,
            id: None,
            raw: false,
            data: Vec::new(),
        }
    }

    /// Rehydrate every stored document of this kind matching the filter.
    pub fn find(&self, backend: &dyn Backend, filter: &Document) -> Result<Vec<Model>> {
        backend
            .find(self.kind(), filter)?
            .into_iter()
            .map(|doc| self.rehydrate(doc))
            .collect()
    }

    /// Rehydrate every stored document of this kind.
    pub fn all(&self, backend: &dyn Backend) -> Result<Vec<Model>> {
        self.find(backend, &Document::new())
    }

    /// The first stored document matching the filter, if any.
    pub fn get(&self, backend: &dyn Backend, filter: &Document) -> Result<Option<Model>> {
        Ok(self.find(backend, filter)?.into_iter().next())
    }

    /// Look up by stored identifier.
    pub fn get_by_key(&self, backend: &dyn Backend, key: &str) -> Result<Option<Model>> {
        let mut filter = Document::new();
        filter.insert("_id".into(), Value::String(key.into()));
        self.get(backend, &filter)
    }

    /// Remove every stored document matching the filter.
    pub fn delete(&self, backend: &dyn Backend, filter: &Document) -> Result<()> {
        backend.remove(self.kind(), filter)
    }

    /// Number of stored documents of this kind.
    pub fn count(&self, backend: &dyn Backend) -> Result<usize> {
        Ok(backend.find(self.kind(), &Document::new())?.len())
    }

    /// Type-level rendering convenience: renders the chosen form over the
    /// field prototypes.
    pub fn render_form(
        &self,
        renderer: &FormRenderer,
        mode: &str,
        form: Option<&str>,
        extra: &Object,
    ) -> Result<String> {
        let fields = self.form().resolve(form, None)?;
        renderer.render(mode, &fields, extra)
    }

    fn rehydrate(&self, mut document: Document) -> Result<Model> {
        let id = document.remove("_id").as_ref().and_then(stringify);
        let mut builder = self.instance().raw(true).data(document);
        if let Some(id) = id {
            builder = builder.id(id);
        }
        builder.build()
    }
}

/// Builder returned by [`ModelType::instance`].
#[derive(Debug)]
pub struct InstanceBuilder {
    ty: ModelType,
    subform: Option<String>,
    id: Option<String>,
    raw: bool,
    data: Vec<(String, Value)>,
}

impl InstanceBuilder {
    /// Bind the instance to a named subform. The catalog is filtered to
    /// that form's fields.
    pub fn subform(mut self, name: impl Into<String>) -> Self {
        self.subform = Some(name.into());
        self
    }

    /// Supply a stored identifier. Key fields lock immediately after
    /// construction.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Bypass value coercion when applying data. Used when rehydrating
    /// from storage.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Append incoming data pairs, applied in order at build time.
    pub fn data(mut self, pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.data.extend(pairs);
        self
    }

    /// Append a single incoming value.
    pub fn set(mut self, name: impl Into<String>, value: Value) -> Self {
        self.data.push((name.into(), value));
        self
    }

    /// Construct the instance: select the subform, reinstance the
    /// prototypes, apply the data, and lock key fields when an identifier
    /// was supplied.
    pub fn build(self) -> Result<Model> {
        let fields: IndexMap<String, Box<dyn Field>> = match self.subform.as_deref() {
            None => self
                .ty
                .inner
                .fields
                .iter()
                .map(|(name, field)| (name.clone(), field.reinstance()))
                .collect(),
            Some(name) => {
                let form = self.ty.form().get(Some(name))?.clone();
                self.ty
                    .inner
                    .fields
                    .iter()
                    .filter(|(field_name, _)| form.fields.contains(field_name))
                    .map(|(name, field)| (name.clone(), field.reinstance()))
                    .collect()
            }
        };

        let mut model = Model {
            ty: self.ty,
            subform: self.subform,
            fields,
            id: self.id,
        };
        model.update(self.data, self.raw);
        if model.id.is_some() {
            model.lock_id();
        }
        Ok(model)
    }
}

/// A runtime instance of a model type, bound to a (possibly partial)
/// field subset.
#[derive(Debug)]
pub struct Model {
    ty: ModelType,
    subform: Option<String>,
    fields: IndexMap<String, Box<dyn Field>>,
    id: Option<String>,
}

impl Model {
    /// The owning model type.
    pub fn model_type(&self) -> &ModelType {
        &self.ty
    }

    /// The bound subform name, if any.
    pub fn subform_name(&self) -> Option<&str> {
        self.subform.as_deref()
    }

    /// The stored identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// A field in this instance's catalog.
    pub fn field(&self, name: &str) -> Option<&dyn Field> {
        self.fields.get(name).map(|f| f.as_ref())
    }

    /// A field's current value.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).map(|f| f.value())
    }

    /// Set a field's value directly, with kind coercion. Unlike the bulk
    /// update path this ignores the lock flag. Returns false for names not
    /// in the catalog.
    pub fn set_value(&mut self, name: &str, value: Value) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Bulk update: unknown names and locked fields are silently skipped.
    pub fn update(&mut self, data: impl IntoIterator<Item = (String, Value)>, raw: bool) {
        for (name, value) in data {
            let Some(field) = self.fields.get_mut(&name) else {
                debug!(model = %self.ty.name(), field = %name, "update skipping unknown field");
                continue;
            };
            if field.locked() {
                debug!(model = %self.ty.name(), field = %name, "update skipping locked field");
                continue;
            }
            if raw {
                field.set_raw(value);
            } else {
                field.set_value(value);
            }
        }
    }

    /// Ordered `(name, value)` pairs over this instance's catalog.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f.value()))
    }

    /// Validate every field; the first invalid field short-circuits.
    pub fn validate(&self) -> bool {
        self.fields.values().all(|field| field.validate())
    }

    /// Names of every invalid field, in catalog order.
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, field)| !field.validate())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Lock every field a list-shaped key spec names. Protects key
    /// integrity once a stored identifier exists.
    pub fn lock_id(&mut self) {
        let Some(spec) = self.ty.key_spec() else {
            return;
        };
        for name in spec.locked_fields().to_vec() {
            if let Some(field) = self.fields.get_mut(&name) {
                field.lock();
            }
        }
    }

    /// String value of a key field. A missing value is a caller contract
    /// violation for every spec shape, single-field specs included —
    /// validate before deriving keys; a partially keyed document never
    /// reaches the store.
    fn key_segment(&self, name: &str) -> String {
        match self.value(name).and_then(stringify) {
            Some(segment) => segment,
            None => panic!("field '{name}' must have a value when referenced by the key spec"),
        }
    }

    /// Derive the persistence identifier per the type's key spec. `None`
    /// when the type has no key spec.
    pub fn key(&self) -> Option<String> {
        match self.ty.key_spec()? {
            KeySpec::Field(name) => Some(self.key_segment(name)),
            KeySpec::Fields(names) => {
                let segments: Vec<_> = names.iter().map(|n| self.key_segment(n)).collect();
                Some(segments.join("::"))
            }
            KeySpec::GeneratedId(names) => {
                // Never regenerate a random id for a stored instance
                if let Some(id) = &self.id {
                    return Some(id.clone());
                }
                let mut segments = vec![uuid::Uuid::new_v4().to_string()];
                segments.extend(names.iter().map(|n| self.key_segment(n)));
                Some(segments.join("::"))
            }
            KeySpec::Custom(derive) => derive(self),
        }
    }

    /// The persisted document: each field's projection, plus `_id` from
    /// the first available of field-provided `_id`, derived key, stored
    /// identifier.
    pub fn to_document(&self) -> Document {
        let mut document: Document = self
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), field.to_document()))
            .collect();

        if !document.contains_key("_id") {
            if let Some(key) = self.key() {
                document.insert("_id".into(), Value::String(key));
            } else if let Some(id) = &self.id {
                document.insert("_id".into(), Value::String(id.clone()));
            }
        }
        document
    }

    /// Persist through the backend and record the identifier it returns.
    pub fn save(&mut self, backend: &dyn Backend) -> Result<String> {
        let id = backend.save(self.ty.kind(), self.to_document(), self.id.as_deref())?;
        self.id = Some(id.clone());
        Ok(id)
    }

    /// A form view over this instance's own fields.
    pub fn form(&self) -> FormView<'_> {
        FormView::new(self.ty.forms(), &self.fields, self.ty.name())
    }

    /// A fresh instance bound to a named subform, carrying this instance's
    /// current field values.
    pub fn subform(&self, name: &str) -> Result<Model> {
        let form = self.form().get(Some(name))?.clone();
        let fields: IndexMap<String, Box<dyn Field>> = self
            .fields
            .iter()
            .filter(|(field_name, _)| form.fields.contains(field_name))
            .map(|(field_name, field)| (field_name.clone(), field.reinstance()))
            .collect();
        Ok(Model {
            ty: self.ty.clone(),
            subform: Some(name.to_string()),
            fields,
            id: None,
        })
    }

    /// Render a form over this instance's fields. An explicit form name
    /// and a bound subform are mutually exclusive.
    pub fn render_form(
        &self,
        renderer: &FormRenderer,
        mode: &str,
        form: Option<&str>,
        extra: &Object,
    ) -> Result<String> {
        assert!(
            form.is_none() || self.subform.is_none(),
            "pass either an explicit form or construct with a subform, not both"
        );
        let name = form.or(self.subform.as_deref());
        let fields = self.form().resolve(name, None)?;
        renderer.render(mode, &fields, extra)
    }
}
