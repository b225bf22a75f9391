//! Key specs: the model-type-level rule for deriving a persistence
//! identifier from field values.

use std::fmt;
use std::sync::Arc;

use crate::declaration::KeyDecl;

/// The reserved marker that makes a list-shaped key spec lead with a
/// generated random identifier.
pub const ID_MARKER: &str = "_id";

/// Derivation callback for [`KeySpec::Custom`].
pub type KeyFn = Arc<dyn Fn(&crate::model::Model) -> Option<String> + Send + Sync>;

/// How a model derives its persistence identifier.
#[derive(Clone)]
pub enum KeySpec {
    /// A single field's string value.
    Field(String),
    /// The `::`-joined string values of the named fields.
    Fields(Vec<String>),
    /// A generated 128-bit random identifier leads, followed by the
    /// `::`-joined string values of the named fields. Never regenerated
    /// once the instance carries a stored identifier.
    GeneratedId(Vec<String>),
    /// Caller-supplied derivation.
    Custom(KeyFn),
}

impl KeySpec {
    /// Build a spec from a declaration `key` entry. A list led by the
    /// literal `_id` marker becomes [`KeySpec::GeneratedId`] over the
    /// remaining names.
    pub fn from_decl(decl: KeyDecl) -> Self {
        match decl {
            KeyDecl::Field(name) => KeySpec::Field(name),
            KeyDecl::Fields(mut names) => {
                if names.first().map(String::as_str) == Some(ID_MARKER) {
                    names.remove(0);
                    KeySpec::GeneratedId(names)
                } else {
                    KeySpec::Fields(names)
                }
            }
        }
    }

    /// The field names a supplied identifier locks against further
    /// mutation. Only list-shaped specs lock.
    pub fn locked_fields(&self) -> &[String] {
        match self {
            KeySpec::Fields(names) | KeySpec::GeneratedId(names) => names,
            KeySpec::Field(_) | KeySpec::Custom(_) => &[],
        }
    }
}

impl fmt::Debug for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::Field(name) => f.debug_tuple("Field").field(name).finish(),
            KeySpec::Fields(names) => f.debug_tuple("Fields").field(names).finish(),
            KeySpec::GeneratedId(names) => f.debug_tuple("GeneratedId").field(names).finish(),
            KeySpec::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
