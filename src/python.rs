// Python bindings (feature `python`)
//
// Exposes the crate-level API as the `_docpath` extension module. Python
// objects are converted to `Document` on the way in and back on the way out.

use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::engine::EngineError;
use crate::reference::{Fallback, Reference};
use crate::value::{Document, Map};

/// A reference to another path, usable as the `default` of `get`.
///
/// ```python
/// import docpath
///
/// doc = {"fallback": 1}
/// docpath.get(doc, "$.missing", docpath.ref("$.fallback"))  # [1]
/// ```
#[pyclass(name = "Reference", frozen)]
struct PyReference {
    inner: Reference,
}

#[pymethods]
impl PyReference {
    #[getter]
    fn path(&self) -> &str {
        self.inner.path()
    }

    fn __repr__(&self) -> String {
        format!("Reference({:?})", self.inner.path())
    }
}

/// Read the value at `path`, or `default` when nothing matches.
///
/// # Errors
///
/// Raises ValueError for malformed paths and unknown functions
#[pyfunction]
#[pyo3(signature = (doc, path, default=None))]
fn get(py: Python, doc: PyObject, path: &str, default: Option<PyObject>) -> PyResult<PyObject> {
    let document = python_to_document(py, &doc)?;
    let fallback = match default {
        None => None,
        Some(obj) => match obj.downcast_bound::<PyReference>(py) {
            Ok(reference) => Some(Fallback::Ref(reference.get().inner.clone())),
            Err(_) if obj.is_none(py) => None,
            Err(_) => Some(Fallback::Value(python_to_document(py, &obj)?)),
        },
    };

    match crate::get(&document, path, fallback).map_err(engine_error_to_py)? {
        Some(value) => document_to_python(py, &value),
        None => Ok(py.None()),
    }
}

/// Write `value` at `path`, creating missing members.
///
/// `doc` is updated in place: dicts and lists the write did not replace keep
/// their identity, so references into the document stay live.
#[pyfunction]
fn set(py: Python, doc: &Bound<'_, PyDict>, path: &str, value: PyObject) -> PyResult<()> {
    let mut document = python_to_document(py, &doc.clone().into_any().unbind())?;
    let value = python_to_document(py, &value)?;
    crate::set(&mut document, path, value).map_err(engine_error_to_py)?;

    if !sync_in_place(py, doc.as_any(), &document)? {
        return Err(PyTypeError::new_err("document root is no longer a dict"));
    }
    Ok(())
}

/// Bring `target` in line with `value` without replacing containers that can
/// be kept. Returns false when `target` cannot represent `value` and the
/// caller has to store a fresh object instead; `target` is untouched then.
///
/// Dicts keep their identity. Lists keep it while their length is unchanged,
/// since a resized array is a replaced array.
fn sync_in_place(py: Python, target: &Bound<'_, PyAny>, value: &Document) -> PyResult<bool> {
    match value {
        Document::Object(map) => {
            let Ok(dict) = target.downcast::<PyDict>() else {
                return Ok(false);
            };
            let mut stale = Vec::new();
            for key in dict.keys().iter() {
                let keep = key.extract::<String>().map_or(false, |k| map.contains_key(&k));
                if !keep {
                    stale.push(key);
                }
            }
            for key in stale {
                dict.del_item(key)?;
            }
            for (key, item) in map.iter() {
                let synced = match dict.get_item(key)? {
                    Some(existing) => sync_in_place(py, &existing, item)?,
                    None => false,
                };
                if !synced {
                    dict.set_item(key, document_to_python(py, item)?)?;
                }
            }
            Ok(true)
        }
        Document::Array(items) => {
            let Ok(list) = target.downcast::<PyList>() else {
                return Ok(false);
            };
            if list.len() != items.len() {
                return Ok(false);
            }
            for (index, item) in items.iter().enumerate() {
                if !sync_in_place(py, &list.get_item(index)?, item)? {
                    list.set_item(index, document_to_python(py, item)?)?;
                }
            }
            Ok(true)
        }
        scalar => {
            let current = python_to_document(py, &target.clone().unbind())?;
            Ok(current == *scalar)
        }
    }
}

/// True when `path` matches at least one node of `doc`.
#[pyfunction]
fn has(py: Python, doc: PyObject, path: &str) -> PyResult<bool> {
    let document = python_to_document(py, &doc)?;
    crate::has(&document, path).map_err(engine_error_to_py)
}

/// Create a reference to `path` for use as a `get` default.
#[pyfunction]
#[pyo3(name = "ref")]
fn make_ref(path: &str) -> PyResult<PyReference> {
    let inner = Reference::new(path).map_err(engine_error_to_py)?;
    Ok(PyReference { inner })
}

/// True only for objects created by `ref`.
#[pyfunction]
fn is_ref(py: Python, obj: PyObject) -> bool {
    obj.downcast_bound::<PyReference>(py).is_ok()
}

/// Resolve every expression string in `template` against `values`.
///
/// `resolver`, when given, is called with each expression string and must
/// return the (possibly rewritten) expression to evaluate.
#[pyfunction]
#[pyo3(signature = (template, values, resolver=None))]
fn deref_recursive(
    py: Python,
    template: PyObject,
    values: PyObject,
    resolver: Option<PyObject>,
) -> PyResult<PyObject> {
    let template = python_to_document(py, &template)?;
    let values = python_to_document(py, &values)?;

    let resolved = match resolver {
        None => crate::deref_recursive(&template, &values).map_err(engine_error_to_py)?,
        Some(callback) => {
            // the first Python error wins; later expressions are left as they are
            let failure: std::cell::RefCell<Option<PyErr>> = std::cell::RefCell::new(None);
            let result = crate::deref_recursive_with(&template, &values, |expr| {
                if failure.borrow().is_some() {
                    return expr.to_string();
                }
                match callback
                    .call1(py, (expr,))
                    .and_then(|out| out.extract::<String>(py))
                {
                    Ok(rewritten) => rewritten,
                    Err(err) => {
                        *failure.borrow_mut() = Some(err);
                        expr.to_string()
                    }
                }
            });
            if let Some(err) = failure.into_inner() {
                return Err(err);
            }
            result.map_err(engine_error_to_py)?
        }
    };

    document_to_python(py, &resolved)
}

/// Convert a Python object to a Document
///
/// - None -> Null
/// - bool -> Bool
/// - int, float -> Number
/// - str -> String
/// - list, tuple -> Array
/// - dict -> Object
fn python_to_document(py: Python, obj: &PyObject) -> PyResult<Document> {
    if obj.is_none(py) {
        return Ok(Document::Null);
    }

    // bool must be tried before int: bool is a subclass of int in Python
    if let Ok(b) = obj.extract::<bool>(py) {
        return Ok(Document::Bool(b));
    }
    if let Ok(i) = obj.extract::<i64>(py) {
        return Ok(Document::from(i));
    }
    if let Ok(f) = obj.extract::<f64>(py) {
        return Ok(Document::from(f));
    }
    if let Ok(s) = obj.extract::<String>(py) {
        return Ok(Document::from(s));
    }
    if let Ok(list) = obj.downcast_bound::<PyList>(py) {
        let mut result = Vec::with_capacity(list.len());
        for item in list.iter() {
            result.push(python_to_document(py, &item.unbind())?);
        }
        return Ok(Document::array(result));
    }
    if let Ok(items) = obj.extract::<Vec<PyObject>>(py) {
        let result = items
            .iter()
            .map(|item| python_to_document(py, item))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Document::array(result));
    }
    if let Ok(dict) = obj.downcast_bound::<PyDict>(py) {
        let mut result = Map::with_capacity(dict.len());
        for (key, value) in dict.iter() {
            let key_str = key.extract::<String>()?;
            result.insert(key_str, python_to_document(py, &value.unbind())?);
        }
        return Ok(Document::object(result));
    }

    Err(PyTypeError::new_err(format!(
        "Cannot convert Python object to a document: {}",
        obj.bind(py).get_type().name()?
    )))
}

/// Convert a Document to a Python object
///
/// Whole numbers come back as int, everything else numeric as float.
fn document_to_python(py: Python, value: &Document) -> PyResult<PyObject> {
    match value {
        Document::Null => Ok(py.None()),

        Document::Bool(b) => Ok(b.to_object(py)),

        Document::Number(n) => match value.as_i64() {
            Some(i) => Ok(i.to_object(py)),
            None => Ok(n.to_object(py)),
        },

        Document::String(s) => Ok(s.to_object(py)),

        Document::Array(arr) => {
            let list = PyList::empty(py);
            for item in arr.iter() {
                list.append(document_to_python(py, item)?)?;
            }
            Ok(list.unbind().into())
        }

        Document::Object(map) => {
            let dict = PyDict::new(py);
            for (key, value) in map.iter() {
                dict.set_item(key, document_to_python(py, value)?)?;
            }
            Ok(dict.unbind().into())
        }
    }
}

/// Convert an EngineError to a PyErr
fn engine_error_to_py(e: EngineError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// docpath Python module
#[pymodule]
fn _docpath(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(get, m)?)?;
    m.add_function(wrap_pyfunction!(set, m)?)?;
    m.add_function(wrap_pyfunction!(has, m)?)?;
    m.add_function(wrap_pyfunction!(make_ref, m)?)?;
    m.add_function(wrap_pyfunction!(is_ref, m)?)?;
    m.add_function(wrap_pyfunction!(deref_recursive, m)?)?;
    m.add_class::<PyReference>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<T>(f: impl FnOnce(Python) -> PyResult<T>) -> T {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| f(py).unwrap())
    }

    #[test]
    fn test_set_keeps_untouched_containers() {
        run(|py| {
            let doc = PyDict::new(py);
            let inner = PyDict::new(py);
            inner.set_item("x", 1)?;
            let list = PyList::new(py, [1, 2])?;
            doc.set_item("a", &inner)?;
            doc.set_item("items", &list)?;

            set(py, &doc, "$.a.b", 1i64.to_object(py))?;
            set(py, &doc, "$.items[0]", 5i64.to_object(py))?;

            assert!(doc.get_item("a")?.unwrap().is(&inner));
            assert!(doc.get_item("items")?.unwrap().is(&list));
            assert_eq!(inner.get_item("b")?.unwrap().extract::<i64>()?, 1);
            assert_eq!(inner.get_item("x")?.unwrap().extract::<i64>()?, 1);
            assert_eq!(list.extract::<Vec<i64>>()?, vec![5, 2]);
            Ok(())
        })
    }

    #[test]
    fn test_set_replaces_resized_arrays() {
        run(|py| {
            let doc = PyDict::new(py);
            let list = PyList::new(py, [1, 2])?;
            doc.set_item("test", &list)?;

            set(py, &doc, "$.test", PyList::new(py, [1])?.into_any().unbind())?;

            let stored = doc.get_item("test")?.unwrap();
            assert!(!stored.is(&list));
            assert_eq!(stored.extract::<Vec<i64>>()?, vec![1]);
            assert_eq!(list.extract::<Vec<i64>>()?, vec![1, 2]);
            Ok(())
        })
    }

    #[test]
    fn test_set_refuses_to_replace_the_root() {
        run(|py| {
            let doc = PyDict::new(py);
            doc.set_item("a", 1)?;

            assert!(set(py, &doc, "$", 5i64.to_object(py)).is_err());
            assert_eq!(doc.len(), 1);
            assert_eq!(doc.get_item("a")?.unwrap().extract::<i64>()?, 1);
            Ok(())
        })
    }
}
