// docpath - Path-addressed access to dynamic documents
// Copyright (c) 2025 docpath contributors
// Licensed under the MIT License

//! # docpath
//!
//! Read, test and write nested documents by path expression.
//!
//! ```
//! use docpath::{document, Fallback};
//!
//! let mut doc = document!({"test": 1, "test2": 2});
//! assert_eq!(docpath::get(&doc, "$.test", None).unwrap(), Some(document!(1)));
//! assert_eq!(
//!     docpath::get(&doc, "concat($.test, $.test2)", None).unwrap(),
//!     Some(document!([1, 2]))
//! );
//!
//! docpath::set(&mut doc, "$.a.b.c", 5).unwrap();
//! assert!(docpath::has(&doc, "$.a.b.c").unwrap());
//!
//! let fallback = Fallback::from(docpath::reference("$.test").unwrap());
//! assert_eq!(docpath::get(&doc, "$.missing", Some(fallback)).unwrap(), Some(document!([1])));
//! ```
//!
//! ## Architecture
//!
//! - `value` - `Document`, the Rc-wrapped dynamic value
//! - `ast` - Path expressions and concrete node locations
//! - `parser` - Path text to `PathExpr`
//! - `evaluator` - Matching paths against documents, in place mutation
//! - `merge` - Deep merge used for leaf writes
//! - `expression` - Telling function calls from plain paths
//! - `functions` - The aggregate function registry (`concat`, `uniq`, `keys`)
//! - `reference` - `Reference` and the `Fallback` default of `get`
//! - `engine` - `get`, `has`, `set` and template resolution

use std::sync::LazyLock;

pub mod ast;
pub mod engine;
pub mod evaluator;
pub mod expression;
pub mod functions;
pub mod merge;
pub mod parser;
pub mod reference;
pub mod value;
mod template;

#[cfg(feature = "python")]
mod python;

pub use ast::PathExpr;
pub use engine::{Engine, EngineError};
pub use functions::FunctionRegistry;
pub use reference::{Fallback, Reference};
pub use value::{Document, Map};

static DEFAULT_ENGINE: LazyLock<Engine> = LazyLock::new(Engine::new);

/// Read `path` from `doc` with the built-in functions. See [`Engine::get`].
pub fn get(
    doc: &Document,
    path: &str,
    default: Option<Fallback>,
) -> Result<Option<Document>, EngineError> {
    DEFAULT_ENGINE.get(doc, path, default)
}

/// Write `value` at `path`, creating missing members. See [`Engine::set`].
pub fn set(doc: &mut Document, path: &str, value: impl Into<Document>) -> Result<(), EngineError> {
    DEFAULT_ENGINE.set(doc, path, value.into())
}

/// True when `path` matches at least one node of `doc`.
pub fn has(doc: &Document, path: &str) -> Result<bool, EngineError> {
    DEFAULT_ENGINE.has(doc, path)
}

/// Build a [`Reference`] to `path`, for use as a `get` default.
pub fn reference(path: impl Into<String>) -> Result<Reference, EngineError> {
    Reference::new(path)
}

/// True only for defaults built from [`reference`].
pub fn is_ref(value: &Fallback) -> bool {
    value.is_ref()
}

/// Resolve every expression string in `template` against `values`.
pub fn deref_recursive(template: &Document, values: &Document) -> Result<Document, EngineError> {
    DEFAULT_ENGINE.deref_recursive(template, values)
}

/// [`deref_recursive`] with a resolver that may rewrite each expression first.
pub fn deref_recursive_with<R>(
    template: &Document,
    values: &Document,
    resolver: R,
) -> Result<Document, EngineError>
where
    R: Fn(&str) -> String,
{
    DEFAULT_ENGINE.deref_recursive_with(template, values, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;

    #[test]
    fn test_free_functions_use_builtin_registry() {
        let doc = document!({"a": {"x": 1, "y": 2}});
        assert_eq!(
            get(&doc, "keys($.a)", None).unwrap(),
            Some(document!(["x", "y"]))
        );
    }

    #[test]
    fn test_set_accepts_plain_values() {
        let mut doc = document!({});
        set(&mut doc, "$.name", "ada").unwrap();
        set(&mut doc, "$.age", 36).unwrap();
        set(&mut doc, "$.ok", true).unwrap();
        assert_eq!(doc, document!({"name": "ada", "age": 36, "ok": true}));
    }

    #[test]
    fn test_reference_helpers() {
        let reference = reference("$.a").unwrap();
        assert!(is_ref(&Fallback::from(reference)));
        assert!(!is_ref(&Fallback::from(document!("$.a"))));
        assert_eq!(super::reference(""), Err(EngineError::EmptyReference));
    }
}
