// Recursive template resolution
//
// Walks a template document and replaces every expression string with the
// value it resolves to in a second document. Objects are rebuilt key by key;
// everything else that is not an expression string is copied untouched,
// arrays included.

use crate::engine::{Engine, EngineError};
use crate::expression::is_expression;
use crate::value::{Document, Map};

impl Engine {
    /// Resolve every expression string in `template` against `values`.
    ///
    /// Expressions that resolve to nothing become `null` so the output keeps
    /// the template's shape. Neither input is modified.
    pub fn deref_recursive(
        &self,
        template: &Document,
        values: &Document,
    ) -> Result<Document, EngineError> {
        self.deref_recursive_with(template, values, |expr| expr.to_string())
    }

    /// Like [`Engine::deref_recursive`], but every expression is first passed
    /// through `resolver`, which may rewrite it before it is evaluated.
    pub fn deref_recursive_with<R>(
        &self,
        template: &Document,
        values: &Document,
        resolver: R,
    ) -> Result<Document, EngineError>
    where
        R: Fn(&str) -> String,
    {
        self.resolve_node(template, values, &resolver)
    }

    fn resolve_node(
        &self,
        node: &Document,
        values: &Document,
        resolver: &dyn Fn(&str) -> String,
    ) -> Result<Document, EngineError> {
        match node {
            Document::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map.iter() {
                    out.insert(key.clone(), self.resolve_node(value, values, resolver)?);
                }
                Ok(Document::object(out))
            }
            Document::String(text) if is_expression(text) => {
                let rewritten = resolver(&**text);
                Ok(self.get(values, &rewritten, None)?.unwrap_or(Document::Null))
            }
            other => Ok(other.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;

    fn values() -> Document {
        document!({
            "user": {"name": "Ada", "langs": {"en": 1, "fr": 2}},
            "tags": ["a", "b", "a"]
        })
    }

    #[test]
    fn test_resolves_nested_paths() {
        let template = document!({
            "name": "$.user.name",
            "meta": {"first_tag": "$.tags[0]", "fixed": 3}
        });
        let out = Engine::new().deref_recursive(&template, &values()).unwrap();
        assert_eq!(
            out,
            document!({"name": "Ada", "meta": {"first_tag": "a", "fixed": 3}})
        );
    }

    #[test]
    fn test_arrays_and_literals_pass_through() {
        let template = document!({
            "list": ["$.user.name", 1],
            "text": "plain",
            "flag": false,
            "nothing": null
        });
        let out = Engine::new().deref_recursive(&template, &values()).unwrap();
        assert_eq!(out, template);
    }

    #[test]
    fn test_function_expressions() {
        let template = document!({
            "langs": "KEYS($.user.langs)",
            "tags": "uniq($.tags[*])"
        });
        let out = Engine::new().deref_recursive(&template, &values()).unwrap();
        assert_eq!(
            out,
            document!({"langs": ["en", "fr"], "tags": ["a", "b"]})
        );
    }

    #[test]
    fn test_missing_values_become_null() {
        let template = document!({"x": "$.nope", "y": "concat($.nope)"});
        let out = Engine::new().deref_recursive(&template, &values()).unwrap();
        assert_eq!(out, document!({"x": null, "y": null}));
    }

    #[test]
    fn test_resolver_rewrites_expressions() {
        let template = document!({"name": "$.name", "other": "literal"});
        let out = Engine::new()
            .deref_recursive_with(&template, &values(), |expr| expr.replacen("$.", "$.user.", 1))
            .unwrap();
        assert_eq!(out, document!({"name": "Ada", "other": "literal"}));
    }

    #[test]
    fn test_unknown_function_propagates() {
        let template = document!({"deep": {"x": "bogus($.tags)"}});
        assert_eq!(
            Engine::new().deref_recursive(&template, &values()),
            Err(EngineError::UnknownFunction("bogus".to_string()))
        );
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let template = document!({"name": "$.user.name"});
        let values = values();
        let before = (template.clone(), values.clone());
        Engine::new().deref_recursive(&template, &values).unwrap();
        assert_eq!((template, values), before);
    }

    #[test]
    fn test_output_keeps_key_order() {
        let template = document!({"z": "$.user.name", "a": 1, "m": {"q": 2, "b": 3}});
        let out = Engine::new().deref_recursive(&template, &values()).unwrap();
        assert_eq!(out.to_string(), r#"{"z":"Ada","a":1,"m":{"q":2,"b":3}}"#);
    }
}
