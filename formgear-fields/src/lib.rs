//! Field value containers, widget descriptors, and kind registries
//!
//! `formgear-fields` is a standalone crate for the value layer of formgear
//! models. It knows nothing about declarations, forms, or persistence —
//! those live in `formgear-models`.
//!
//! # Architecture
//!
//! - **Fields are trait objects**: one `Field` implementation per kind,
//!   owning its coercion rules, validation predicate, and document
//!   projection
//! - **Prototype then reinstance**: model types hold field prototypes;
//!   `reinstance()` produces the independent per-instance copies
//! - **Open catalogs**: both registries are plain values seeded with
//!   builtins; third parties register further kinds

pub mod error;
pub mod field;
pub mod kinds;
pub mod registry;
pub mod widget;

pub use error::{FieldsError, Result};
pub use field::{Field, FieldCommon};
pub use registry::{FieldConstructor, FieldKind, FieldRegistry};
pub use widget::{Widget, WidgetConstructor, WidgetRegistry};
