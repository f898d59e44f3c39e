// Aggregate function registry
//
// An aggregate takes the document plus the parsed argument paths of a call
// such as `uniq($.a, $.b)` and returns the sequence of values it produces.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::ast::PathExpr;
use crate::value::Document;

/// Function errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
}

/// A registered aggregate operation. Must be pure.
pub type Aggregate = Arc<dyn Fn(&Document, &[PathExpr]) -> Vec<Document> + Send + Sync>;

/// Immutable name → aggregate table, keyed by lower-cased name.
///
/// Build one with [`FunctionRegistry::builtin`] or [`FunctionRegistry::empty`]
/// and extend it with [`FunctionRegistry::with`]; hand it to
/// [`crate::Engine::with_registry`].
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: IndexMap<String, Aggregate>,
}

impl FunctionRegistry {
    /// A registry with no functions at all.
    pub fn empty() -> Self {
        FunctionRegistry {
            functions: IndexMap::new(),
        }
    }

    /// `concat`, `uniq` and `keys`.
    pub fn builtin() -> Self {
        Self::empty()
            .with("concat", aggregate::concat)
            .with("uniq", aggregate::uniq)
            .with("keys", aggregate::keys)
    }

    /// Return a registry that also knows `name`. An existing entry under the
    /// same lower-cased name is replaced.
    pub fn with<F>(mut self, name: &str, function: F) -> Self
    where
        F: Fn(&Document, &[PathExpr]) -> Vec<Document> + Send + Sync + 'static,
    {
        self.functions
            .insert(name.to_lowercase(), Arc::new(function));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn lookup(&self, name: &str) -> Result<&Aggregate, FunctionError> {
        self.functions
            .get(&name.to_lowercase())
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Built-in aggregates
pub mod aggregate {
    use super::*;
    use crate::evaluator::query;

    /// Matches of every path, flattened in argument order. Duplicates are kept.
    pub fn concat(doc: &Document, paths: &[PathExpr]) -> Vec<Document> {
        paths
            .iter()
            .flat_map(|path| query(path, doc))
            .cloned()
            .collect()
    }

    /// `concat` with later duplicates removed.
    pub fn uniq(doc: &Document, paths: &[PathExpr]) -> Vec<Document> {
        let mut result: Vec<Document> = Vec::new();
        for value in concat(doc, paths) {
            if !result.contains(&value) {
                result.push(value);
            }
        }
        result
    }

    /// Keys of every object the paths match, concatenated. Non-objects add nothing.
    pub fn keys(doc: &Document, paths: &[PathExpr]) -> Vec<Document> {
        paths
            .iter()
            .flat_map(|path| query(path, doc))
            .filter_map(Document::as_object)
            .flat_map(|map| map.keys().map(|key| Document::string(key.as_str())))
            .collect()
    }
}
