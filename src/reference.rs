// Deferred references used as `get` defaults

use std::fmt;

use crate::engine::EngineError;
use crate::value::Document;

/// "Use whatever this path resolves to", as the default of a `get`.
///
/// The path is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    path: String,
}

impl Reference {
    pub fn new(path: impl Into<String>) -> Result<Self, EngineError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(EngineError::EmptyReference);
        }
        Ok(Reference { path })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref({})", self.path)
    }
}

/// The default handed to `get`: a literal document or a reference to resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    Value(Document),
    Ref(Reference),
}

impl Fallback {
    pub fn is_ref(&self) -> bool {
        matches!(self, Fallback::Ref(_))
    }
}

impl From<Document> for Fallback {
    fn from(value: Document) -> Self {
        Fallback::Value(value)
    }
}

impl From<Reference> for Fallback {
    fn from(reference: Reference) -> Self {
        Fallback::Ref(reference)
    }
}
