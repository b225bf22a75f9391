//! Builtin field kinds: string, number, boolean, datetime, select.
//!
//! Each kind owns its coercion rules and validation predicate. The catalog
//! is open — third parties register further kinds on a `FieldRegistry`.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::error::{FieldsError, Result};
use crate::field::{note_leftover_options, Field, FieldCommon};
use crate::widget::Widget;

macro_rules! common_accessors {
    ($kind:literal) => {
        fn kind(&self) -> &'static str {
            $kind
        }

        fn title(&self) -> Option<&str> {
            self.common.title.as_deref()
        }

        fn widget(&self) -> &Widget {
            &self.common.widget
        }

        fn required(&self) -> bool {
            self.common.required
        }

        fn locked(&self) -> bool {
            self.common.locked
        }

        fn lock(&mut self) {
            self.common.locked = true;
        }

        fn value(&self) -> &Value {
            &self.common.value
        }

        fn set_raw(&mut self, value: Value) {
            self.common.value = value;
        }

        fn reinstance(&self) -> Box<dyn Field> {
            Box::new(self.clone())
        }
    };
}

/// Required-ness check shared by every kind: a null value only passes when
/// the field is optional.
fn presence_ok(common: &FieldCommon) -> Option<bool> {
    if common.value.is_null() {
        return Some(!common.required);
    }
    None
}

// --- string ---

#[derive(Debug, Clone)]
pub struct StringField {
    common: FieldCommon,
}

pub fn string(widget: Widget, mut options: Map<String, Value>) -> Result<Box<dyn Field>> {
    let common = FieldCommon::from_options(widget, &mut options);
    note_leftover_options("string", &options);
    let mut field = StringField { common };
    let default = std::mem::take(&mut field.common.value);
    if !default.is_null() {
        field.set_value(default);
    }
    Ok(Box::new(field))
}

impl Field for StringField {
    common_accessors!("string");

    fn set_value(&mut self, value: Value) {
        self.common.value = match value {
            Value::String(_) | Value::Null => value,
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            other => other,
        };
    }

    fn validate(&self) -> bool {
        if let Some(ok) = presence_ok(&self.common) {
            return ok;
        }
        self.common.value.is_string()
    }
}

// --- number ---

#[derive(Debug, Clone)]
pub struct NumberField {
    common: FieldCommon,
    min: Option<f64>,
    max: Option<f64>,
}

pub fn number(widget: Widget, mut options: Map<String, Value>) -> Result<Box<dyn Field>> {
    let common = FieldCommon::from_options(widget, &mut options);
    let min = options.remove("min").and_then(|v| v.as_f64());
    let max = options.remove("max").and_then(|v| v.as_f64());
    note_leftover_options("number", &options);
    let mut field = NumberField { common, min, max };
    let default = std::mem::take(&mut field.common.value);
    if !default.is_null() {
        field.set_value(default);
    }
    Ok(Box::new(field))
}

impl Field for NumberField {
    common_accessors!("number");

    fn set_value(&mut self, value: Value) {
        self.common.value = match value {
            Value::Number(_) | Value::Null => value,
            Value::String(ref s) => match s.parse::<f64>() {
                Ok(n) => serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(value),
                Err(_) => value,
            },
            other => other,
        };
    }

    fn validate(&self) -> bool {
        if let Some(ok) = presence_ok(&self.common) {
            return ok;
        }
        let Some(n) = self.common.value.as_f64() else {
            return false;
        };
        if self.min.is_some_and(|min| n < min) {
            return false;
        }
        if self.max.is_some_and(|max| n > max) {
            return false;
        }
        true
    }
}

// --- boolean ---

#[derive(Debug, Clone)]
pub struct BooleanField {
    common: FieldCommon,
}

pub fn boolean(widget: Widget, mut options: Map<String, Value>) -> Result<Box<dyn Field>> {
    let common = FieldCommon::from_options(widget, &mut options);
    note_leftover_options("boolean", &options);
    let mut field = BooleanField { common };
    let default = std::mem::take(&mut field.common.value);
    if !default.is_null() {
        field.set_value(default);
    }
    Ok(Box::new(field))
}

impl Field for BooleanField {
    common_accessors!("boolean");

    fn set_value(&mut self, value: Value) {
        self.common.value = match value {
            Value::Bool(_) | Value::Null => value,
            Value::String(ref s) => match s.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => value,
            },
            Value::Number(ref n) => match n.as_i64() {
                Some(0) => Value::Bool(false),
                Some(1) => Value::Bool(true),
                _ => value,
            },
            other => other,
        };
    }

    fn validate(&self) -> bool {
        if let Some(ok) = presence_ok(&self.common) {
            return ok;
        }
        self.common.value.is_boolean()
    }
}

// --- datetime ---

#[derive(Debug, Clone)]
pub struct DatetimeField {
    common: FieldCommon,
}

pub fn datetime(widget: Widget, mut options: Map<String, Value>) -> Result<Box<dyn Field>> {
    let common = FieldCommon::from_options(widget, &mut options);
    note_leftover_options("datetime", &options);
    let mut field = DatetimeField { common };
    let default = std::mem::take(&mut field.common.value);
    if !default.is_null() {
        field.set_value(default);
    }
    Ok(Box::new(field))
}

impl DatetimeField {
    fn parse(value: &Value) -> Option<DateTime<FixedOffset>> {
        value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}

impl Field for DatetimeField {
    common_accessors!("datetime");

    /// RFC 3339 strings are normalized; anything else is kept as-is and
    /// fails validation.
    fn set_value(&mut self, value: Value) {
        self.common.value = match Self::parse(&value) {
            Some(dt) => Value::String(dt.to_rfc3339()),
            None => value,
        };
    }

    fn validate(&self) -> bool {
        if let Some(ok) = presence_ok(&self.common) {
            return ok;
        }
        Self::parse(&self.common.value).is_some()
    }
}

// --- select ---

#[derive(Debug, Clone)]
pub struct SelectField {
    common: FieldCommon,
    choices: Vec<String>,
}

pub fn select(widget: Widget, mut options: Map<String, Value>) -> Result<Box<dyn Field>> {
    let common = FieldCommon::from_options(widget, &mut options);
    let choices = match options.remove("choices") {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Some(_) => {
            return Err(FieldsError::InvalidOptions {
                kind: "select".into(),
                message: "choices must be a list".into(),
            })
        }
        None => Vec::new(),
    };
    note_leftover_options("select", &options);
    let mut field = SelectField { common, choices };
    let default = std::mem::take(&mut field.common.value);
    if !default.is_null() {
        field.set_value(default);
    }
    Ok(Box::new(field))
}

impl SelectField {
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl Field for SelectField {
    common_accessors!("select");

    fn set_value(&mut self, value: Value) {
        self.common.value = match value {
            Value::String(_) | Value::Null => value,
            Value::Number(n) => Value::String(n.to_string()),
            other => other,
        };
    }

    fn validate(&self) -> bool {
        if let Some(ok) = presence_ok(&self.common) {
            return ok;
        }
        self.common
            .value
            .as_str()
            .is_some_and(|v| self.choices.iter().any(|c| c == v))
    }
}
