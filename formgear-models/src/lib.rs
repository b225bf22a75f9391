//! Declaration-driven model types, forms, and document persistence
//!
//! `formgear-models` turns a schema declaration (fields, widgets, forms,
//! key spec) into a model type — an ordered field-prototype catalog with
//! named form views — and mediates between that type's instances, rendered
//! forms, and a document-store backend.
//!
//! # Architecture
//!
//! - **Factory, not reflection**: `ModelType::declare(..).build(..)` runs
//!   once per type at load time and yields a plain descriptor; instances
//!   are a generic structure parameterized by it
//! - **Prototype then reinstance**: each instance clones the prototypes it
//!   needs for its subform, so no state leaks across instances
//! - **Explicit collaborators**: the field/widget registries, the model
//!   registry, the store backend, and the renderer are all passed-around
//!   values, not globals

pub mod declaration;
pub mod error;
pub mod forms;
pub mod key;
pub mod model;
pub mod registry;
pub mod render;
pub mod store;

pub use declaration::{Declaration, FieldDecl, FormDecl, KeyDecl, WidgetDecl};
pub use error::{ModelError, Result};
pub use forms::{FormDef, FormSet, FormView};
pub use key::{KeySpec, ID_MARKER};
pub use model::{InstanceBuilder, Model, ModelType, ModelTypeBuilder};
pub use registry::ModelRegistry;
pub use render::FormRenderer;
pub use store::{Backend, Document, MemoryBackend};
