// Path resolver and expression dispatcher
//
// `get`, `has` and `set` over a `Document`. Function calls are routed to the
// injected `FunctionRegistry`; plain paths go to the evaluator.

use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::{PathExpr, Segment};
use crate::evaluator;
use crate::expression::Expression;
use crate::functions::{FunctionError, FunctionRegistry};
use crate::merge::deep_merge;
use crate::parser::{self, ParserError};
use crate::reference::Fallback;
use crate::value::Document;

/// Engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid path '{path}': {source}")]
    InvalidPath { path: String, source: ParserError },

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Cannot resolve any prefix of '{0}', not even the root")]
    Unresolvable(String),

    #[error("Cannot create '{segment}' while writing '{path}': only member names can be created")]
    NotVivifiable { path: String, segment: String },

    #[error("A reference needs a non-empty path")]
    EmptyReference,
}

impl From<FunctionError> for EngineError {
    fn from(e: FunctionError) -> Self {
        match e {
            FunctionError::UnknownFunction(name) => EngineError::UnknownFunction(name),
        }
    }
}

/// Parse a plain path, keeping the offending text in the error.
pub(crate) fn compile(path: &str) -> Result<PathExpr, EngineError> {
    parser::parse(path).map_err(|source| EngineError::InvalidPath {
        path: path.to_string(),
        source,
    })
}

/// Query/mutation engine bound to one function registry.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    registry: FunctionRegistry,
}

impl Engine {
    /// An engine with the built-in functions.
    pub fn new() -> Self {
        Engine {
            registry: FunctionRegistry::builtin(),
        }
    }

    pub fn with_registry(registry: FunctionRegistry) -> Self {
        Engine { registry }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Read the value at `path`.
    ///
    /// A plain path yields its first match. A function call yields the array
    /// it produced. When nothing matches, the default decides: a literal is
    /// returned as is, a reference yields an array of every match of its path,
    /// and no default yields `None`.
    ///
    /// # Errors
    ///
    /// `InvalidPath` for malformed paths, `UnknownFunction` for calls to
    /// unregistered functions. A missing path is never an error.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path))]
    pub fn get(
        &self,
        doc: &Document,
        path: &str,
        default: Option<Fallback>,
    ) -> Result<Option<Document>, EngineError> {
        let found = match Expression::classify(path) {
            Expression::Call { name, args } => {
                let results = self.dispatch(doc, &name, &args)?;
                (!results.is_empty()).then(|| Document::array(results))
            }
            Expression::Path(text) | Expression::Literal(text) => {
                let expr = compile(text)?;
                evaluator::query(&expr, doc).first().map(|value| (*value).clone())
            }
        };

        if found.is_some() {
            return Ok(found);
        }

        match default {
            Some(Fallback::Ref(reference)) => {
                let expr = compile(reference.path())?;
                trace!(reference = reference.path(), "resolving referenced default");
                let matches = evaluator::query(&expr, doc).into_iter().cloned().collect();
                Ok(Some(Document::array(matches)))
            }
            Some(Fallback::Value(value)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    /// True when the plain path `path` matches at least one node.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path))]
    pub fn has(&self, doc: &Document, path: &str) -> Result<bool, EngineError> {
        let expr = compile(path)?;
        Ok(!evaluator::query(&expr, doc).is_empty())
    }

    /// Write `value` at every node `path` matches, creating missing members
    /// along the way.
    ///
    /// An object written onto an object is deep-merged into it; every other
    /// write replaces the node.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path))]
    pub fn set(&self, doc: &mut Document, path: &str, value: Document) -> Result<(), EngineError> {
        let expr = compile(path)?;

        if write_all(&expr, doc, &value) > 0 {
            return Ok(());
        }

        debug!("path does not exist yet, creating it");
        vivify(doc, &expr, path)?;

        if write_all(&expr, doc, &value) == 0 {
            return Err(EngineError::Unresolvable(path.to_string()));
        }
        Ok(())
    }

    fn dispatch(
        &self,
        doc: &Document,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<Document>, EngineError> {
        // an unknown name wins over malformed arguments
        let function = self.registry.lookup(name)?;
        let paths = args
            .iter()
            .map(|arg| compile(arg))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(function = name, args = paths.len(), "dispatching function call");
        Ok(function(doc, paths.as_slice()))
    }
}

fn write_all(expr: &PathExpr, doc: &mut Document, value: &Document) -> usize {
    evaluator::apply(expr, doc, |slot| deep_merge(slot, value.clone()))
}

/// Make the parent of `expr` exist and give it the final member, set to null.
fn vivify(doc: &mut Document, expr: &PathExpr, path: &str) -> Result<(), EngineError> {
    let Some((parent, last)) = expr.split_last() else {
        return Err(EngineError::Unresolvable(path.to_string()));
    };
    let Segment::Child(key) = last else {
        return Err(EngineError::NotVivifiable {
            path: path.to_string(),
            segment: last.to_string(),
        });
    };

    let mut locations = evaluator::locate(&parent, doc);
    if locations.is_empty() {
        vivify(doc, &parent, path)?;
        locations = evaluator::locate(&parent, doc);
        if locations.is_empty() {
            return Err(EngineError::Unresolvable(path.to_string()));
        }
    }

    for location in &locations {
        if let Some(slot) = evaluator::resolve_mut(doc, location) {
            if !slot.is_object() {
                debug!(at = %location, replaced = slot.kind(), "replacing with an object");
            }
            if slot.get(key).is_none() {
                debug!(at = %location, member = key.as_str(), "creating member");
                deep_merge(slot, Document::single(key.as_str(), Document::Null));
            }
        }
    }
    Ok(())
}
