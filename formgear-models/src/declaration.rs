//! Schema declaration files.
//!
//! A declaration is a YAML mapping with optional `description`, `title`,
//! `key`, an ordered `fields` list, and an ordered `forms` list. Everything
//! in a field entry beyond `name`, `type`, and `widget` passes through to
//! the field constructor untouched, except a string-valued `choices` entry,
//! which is resolved as a YAML file relative to the declaration's own
//! directory.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ModelError, Result};

/// A parsed schema declaration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Declaration {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub key: Option<KeyDecl>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub forms: Vec<FormDecl>,
}

/// One field entry. `name` is required but checked at build time so the
/// error names the model rather than failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub widget: Option<WidgetDecl>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// Widget spec: a bare kind tag, or a mapping with its own `type` plus
/// keyword options.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WidgetDecl {
    Tag(String),
    Spec {
        #[serde(rename = "type", default)]
        type_: Option<String>,
        #[serde(flatten)]
        options: Map<String, Value>,
    },
}

/// Key spec as declared: a single field name, or an ordered field-name list
/// (optionally led by the literal `_id` marker).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeyDecl {
    Field(String),
    Fields(Vec<String>),
}

/// One declared form: a name and an ordered field-name list.
#[derive(Debug, Clone, Deserialize)]
pub struct FormDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl Declaration {
    /// Load a declaration from a YAML file and resolve file-relative
    /// references against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ModelError::DeclarationNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ModelError::Io(e)
            }
        })?;
        let mut decl: Declaration = serde_yaml_ng::from_str(&content)?;
        if let Some(dir) = path.parent() {
            decl.resolve_choice_files(dir)?;
        }
        debug!(path = %path.display(), fields = decl.fields.len(), "declaration loaded");
        Ok(decl)
    }

    /// Replace string-valued `choices` options with the contents of the
    /// referenced YAML file, resolved relative to `base`.
    pub fn resolve_choice_files(&mut self, base: &Path) -> Result<()> {
        for field in &mut self.fields {
            let Some(Value::String(relative)) = field.options.get("choices") else {
                continue;
            };
            let target = base.join(relative);
            let content = fs::read_to_string(&target).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ModelError::DeclarationNotFound {
                        path: target.clone(),
                    }
                } else {
                    ModelError::Io(e)
                }
            })?;
            let loaded: Value = serde_yaml_ng::from_str(&content)?;
            debug!(path = %target.display(), "resolved choices file");
            field.options.insert("choices".into(), loaded);
        }
        Ok(())
    }

    /// Look up a field entry by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const ORDER_YAML: &str = r#"
title: Orders
description: Customer orders
key: [_id, status]
fields:
  - name: status
    type: select
    title: Status
    choices: [open, closed]
  - name: total
    type: number
    widget:
      type: text
      size: 8
forms:
  - name: quick
    fields: [status]
"#;

    #[test]
    fn parses_full_declaration() {
        let decl: Declaration = serde_yaml_ng::from_str(ORDER_YAML).unwrap();
        assert_eq!(decl.title.as_deref(), Some("Orders"));
        assert_eq!(decl.description.as_deref(), Some("Customer orders"));
        assert_eq!(decl.fields.len(), 2);
        assert_eq!(decl.forms.len(), 1);

        let status = &decl.fields[0];
        assert_eq!(status.name.as_deref(), Some("status"));
        assert_eq!(status.type_.as_deref(), Some("select"));
        assert_eq!(status.options.get("title"), Some(&json!("Status")));
        assert_eq!(
            status.options.get("choices"),
            Some(&json!(["open", "closed"]))
        );

        match &decl.key {
            Some(KeyDecl::Fields(names)) => assert_eq!(names, &["_id", "status"]),
            other => panic!("unexpected key decl: {other:?}"),
        }
    }

    #[test]
    fn widget_spec_mapping_form() {
        let decl: Declaration = serde_yaml_ng::from_str(ORDER_YAML).unwrap();
        match &decl.fields[1].widget {
            Some(WidgetDecl::Spec { type_, options }) => {
                assert_eq!(type_.as_deref(), Some("text"));
                assert_eq!(options.get("size"), Some(&json!(8)));
            }
            other => panic!("unexpected widget decl: {other:?}"),
        }
    }

    #[test]
    fn widget_bare_tag_form() {
        let decl: Declaration = serde_yaml_ng::from_str(
            "fields:\n  - name: note\n    widget: textarea\n",
        )
        .unwrap();
        assert!(matches!(
            decl.fields[0].widget,
            Some(WidgetDecl::Tag(ref tag)) if tag == "textarea"
        ));
    }

    #[test]
    fn scalar_key_decl() {
        let decl: Declaration = serde_yaml_ng::from_str("key: slug\n").unwrap();
        assert!(matches!(decl.key, Some(KeyDecl::Field(ref f)) if f == "slug"));
    }

    #[test]
    fn load_missing_file_is_declaration_not_found() {
        let err = Declaration::load("/nonexistent/order.yaml").unwrap_err();
        assert!(matches!(err, ModelError::DeclarationNotFound { .. }));
    }

    #[test]
    fn unreadable_declaration_is_io_error() {
        let tmp = TempDir::new().unwrap();
        // the path exists but is a directory, so the read itself fails
        let err = Declaration::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ModelError::Io(_)));
    }

    #[test]
    fn load_malformed_yaml_is_yaml_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.yaml");
        fs::write(&path, "fields: [}").unwrap();
        let err = Declaration::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::Yaml(_)));
    }

    #[test]
    fn choices_file_resolved_relative_to_declaration() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("statuses.yaml"), "- open\n- closed\n").unwrap();
        let decl_path = tmp.path().join("order.yaml");
        fs::write(
            &decl_path,
            "fields:\n  - name: status\n    type: select\n    choices: statuses.yaml\n",
        )
        .unwrap();

        let decl = Declaration::load(&decl_path).unwrap();
        assert_eq!(
            decl.fields[0].options.get("choices"),
            Some(&json!(["open", "closed"]))
        );
    }

    #[test]
    fn missing_choices_file_errors() {
        let tmp = TempDir::new().unwrap();
        let decl_path = tmp.path().join("order.yaml");
        fs::write(
            &decl_path,
            "fields:\n  - name: status\n    choices: gone.yaml\n",
        )
        .unwrap();

        let err = Declaration::load(&decl_path).unwrap_err();
        assert!(matches!(err, ModelError::DeclarationNotFound { path } if path.ends_with("gone.yaml")));
    }

    #[test]
    fn inline_choices_left_alone() {
        let tmp = TempDir::new().unwrap();
        let decl_path = tmp.path().join("order.yaml");
        fs::write(
            &decl_path,
            "fields:\n  - name: status\n    choices: [open, closed]\n",
        )
        .unwrap();

        let decl = Declaration::load(&decl_path).unwrap();
        assert_eq!(
            decl.fields[0].options.get("choices"),
            Some(&json!(["open", "closed"]))
        );
    }
}
