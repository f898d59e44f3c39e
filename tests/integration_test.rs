// Integration tests for the public get/set/has API
//
// These exercise the crate the way callers do: through the free functions
// and `Engine`, on documents built with `document!` or parsed from JSON.

use docpath::functions::{aggregate, FunctionRegistry};
use docpath::{document, Document, Engine, EngineError, Fallback};
use pretty_assertions::assert_eq;

fn fixture() -> Document {
    document!({"test": 1, "test2": 2})
}

// ── get ──────────────────────────────────────────────────────────────────────

#[test]
fn test_get_by_path() {
    assert_eq!(docpath::get(&fixture(), "$.test", None).unwrap(), Some(document!(1)));
}

#[test]
fn test_get_default_when_path_is_empty() {
    let default = Some(Fallback::from(document!(2)));
    assert_eq!(
        docpath::get(&fixture(), "$.nothing", default).unwrap(),
        Some(document!(2))
    );
}

#[test]
fn test_get_nothing_without_default() {
    assert_eq!(docpath::get(&fixture(), "$.nothing", None).unwrap(), None);
}

#[test]
fn test_get_concat_and_uniq() {
    let doc = fixture();
    for expr in ["concat($.test, $.test2)", "uniq($.test, $.test2)", "UNIQ($.test, $.test2)"] {
        assert_eq!(docpath::get(&doc, expr, None).unwrap(), Some(document!([1, 2])), "{expr}");
    }
}

#[test]
fn test_get_found_value_ignores_every_kind_of_default() {
    let doc = fixture();
    let defaults = [
        Fallback::from(document!(99)),
        Fallback::from(document!(null)),
        Fallback::from(docpath::reference("$.test2").unwrap()),
    ];
    for default in defaults {
        assert_eq!(docpath::get(&doc, "$.test", Some(default)).unwrap(), Some(document!(1)));
    }
}

#[test]
fn test_get_literal_default_is_returned_unchanged() {
    let default = document!({"path": "$.test", "nested": [1, {"x": null}]});
    assert_eq!(
        docpath::get(&fixture(), "$.nothing", Some(Fallback::from(default.clone()))).unwrap(),
        Some(default)
    );
}

#[test]
fn test_get_reference_default() {
    let doc = document!({"items": [{"id": "a"}, {"id": "b"}]});
    let fallback = Fallback::from(docpath::reference("$.items[*].id").unwrap());
    assert_eq!(
        docpath::get(&doc, "$.missing", Some(fallback)).unwrap(),
        Some(document!(["a", "b"]))
    );
}

#[test]
fn test_get_keys_single_and_multi_argument() {
    let doc = document!({"a": {"x": 1, "y": 2}, "b": {"z": 3}});
    assert_eq!(
        docpath::get(&doc, "KEYS($.a)", None).unwrap(),
        Some(document!(["x", "y"]))
    );
    assert_eq!(
        docpath::get(&doc, "keys($.a, $.b)", None).unwrap(),
        Some(document!(["x", "y", "z"]))
    );
}

#[test]
fn test_unknown_function_is_an_error_not_a_default() {
    let default = Some(Fallback::from(document!("fallback")));
    let err = docpath::get(&fixture(), "sum($.test)", default).unwrap_err();
    assert_eq!(err, EngineError::UnknownFunction("sum".to_string()));
    assert!(err.to_string().contains("sum"));
}

#[test]
fn test_extreme_slice_steps_resolve_normally() {
    let doc = document!({"arr": [1, 2, 3]});
    assert_eq!(
        docpath::get(&doc, "$.arr[1::9223372036854775807]", None).unwrap(),
        Some(document!(2))
    );
    assert_eq!(
        docpath::get(&doc, "concat($.arr[::-9223372036854775808])", None).unwrap(),
        Some(document!([3]))
    );
    assert!(docpath::has(&doc, "$.arr[0::9223372036854775807]").unwrap());
}

#[test]
fn test_invalid_path_reports_the_path() {
    let err = docpath::get(&fixture(), "$.a[", None).unwrap_err();
    match err {
        EngineError::InvalidPath { path, .. } => assert_eq!(path, "$.a["),
        other => panic!("expected InvalidPath, got {other:?}"),
    }
}

// ── set ──────────────────────────────────────────────────────────────────────

#[test]
fn test_set_existing_value() {
    let mut doc = document!({"test": 1});
    docpath::set(&mut doc, "$.test", 2).unwrap();
    assert_eq!(doc.get("test"), Some(&document!(2)));
}

#[test]
fn test_set_creates_missing_value() {
    let mut doc = document!({});
    docpath::set(&mut doc, "$.test", 1).unwrap();
    assert_eq!(doc, document!({"test": 1}));
}

#[test]
fn test_set_creates_nested_values() {
    let mut doc = document!({});
    docpath::set(&mut doc, "$.test1.test2", 1).unwrap();
    assert_eq!(doc, document!({"test1": {"test2": 1}}));
}

#[test]
fn test_set_updates_values_it_created() {
    let mut doc = document!({});
    docpath::set(&mut doc, "$.test1.test2", true).unwrap();
    docpath::set(&mut doc, "$.test1.test2", false).unwrap();
    assert_eq!(docpath::get(&doc, "$.test1.test2", None).unwrap(), Some(document!(false)));
}

#[test]
fn test_set_replaces_arrays() {
    let mut doc = document!({"test": [1, 2]});
    docpath::set(&mut doc, "$.test", document!([1])).unwrap();
    assert_eq!(doc, document!({"test": [1]}));

    let mut doc = document!({"test": [1]});
    docpath::set(&mut doc, "$.test", document!([2, 3, 4])).unwrap();
    assert_eq!(doc.get("test").and_then(Document::as_array).map(Vec::len), Some(3));
}

#[test]
fn test_set_then_get_round_trip_at_depth() {
    let values = [
        document!(null),
        document!(0),
        document!("text"),
        document!([1, [2, 3]]),
        document!({"inner": true}),
    ];
    for value in values {
        let mut doc = document!({});
        docpath::set(&mut doc, "$.a.b.c.d.e", value.clone()).unwrap();
        assert_eq!(docpath::get(&doc, "$.a.b.c.d.e", None).unwrap(), Some(value));
    }
}

#[test]
fn test_repeated_set_keeps_vivified_siblings() {
    let mut doc = document!({});
    docpath::set(&mut doc, "$.a.b", 1).unwrap();
    docpath::set(&mut doc, "$.a.c", 2).unwrap();
    docpath::set(&mut doc, "$.a.b", 3).unwrap();
    assert_eq!(doc, document!({"a": {"b": 3, "c": 2}}));
}

#[test]
fn test_set_merges_objects() {
    let mut doc = document!({});
    docpath::set(&mut doc, "$.cfg", document!({"a": 1})).unwrap();
    docpath::set(&mut doc, "$.cfg", document!({"b": 2})).unwrap();
    assert_eq!(doc, document!({"cfg": {"a": 1, "b": 2}}));
}

#[test]
fn test_set_through_wildcard_writes_every_match() {
    let mut doc = document!({"users": [{"name": "a"}, {"name": "b"}]});
    docpath::set(&mut doc, "$.users[*].active", true).unwrap();
    assert_eq!(
        doc,
        document!({"users": [{"name": "a", "active": true}, {"name": "b", "active": true}]})
    );
}

#[test]
fn test_set_cannot_create_array_slots() {
    let mut doc = document!({"list": []});
    let err = docpath::set(&mut doc, "$.list[3]", 1).unwrap_err();
    assert!(matches!(err, EngineError::NotVivifiable { .. }), "{err:?}");
    assert_eq!(doc, document!({"list": []}));
}

// ── has ──────────────────────────────────────────────────────────────────────

#[test]
fn test_has_matches_get_with_sentinel() {
    let doc = document!({"a": {"b": null}, "list": [0, false], "empty": {}});
    let sentinel = document!({"__sentinel__": "c1a4f0"});
    for path in ["$", "$.a", "$.a.b", "$.a.c", "$.list[1]", "$.list[5]", "$.empty.x", "$..b"] {
        let via_get = docpath::get(&doc, path, Some(Fallback::from(sentinel.clone()))).unwrap();
        assert_eq!(docpath::has(&doc, path).unwrap(), via_get != Some(sentinel.clone()), "{path}");
    }
}

// ── references ───────────────────────────────────────────────────────────────

#[test]
fn test_is_ref_only_for_references() {
    assert!(docpath::is_ref(&Fallback::from(docpath::reference("$.a").unwrap())));
    for value in [document!(null), document!("ref($.a)"), document!({"path": "$.a"})] {
        assert!(!docpath::is_ref(&Fallback::from(value)));
    }
}

// ── deref_recursive ──────────────────────────────────────────────────────────

#[test]
fn test_deref_recursive_preserves_shape() {
    let values = Document::from_json_str(
        r#"{"user": {"first": "Ada", "last": "Lovelace", "langs": {"en": 1, "fr": 1}}, "ids": [3, 1, 3]}"#,
    )
    .unwrap();
    let template = document!({
        "name": {"first": "$.user.first", "last": "$['user']['last']"},
        "langs": "keys($.user.langs)",
        "ids": "uniq($.ids[*])",
        "raw": ["$.user.first", 2],
        "note": "hello"
    });

    let out = docpath::deref_recursive(&template, &values).unwrap();
    assert_eq!(
        out,
        document!({
            "name": {"first": "Ada", "last": "Lovelace"},
            "langs": ["en", "fr"],
            "ids": [3, 1],
            "raw": ["$.user.first", 2],
            "note": "hello"
        })
    );
}

#[test]
fn test_deref_recursive_with_resolver() {
    let values = document!({"env": {"prod": {"host": "db.prod"}}});
    let template = document!({"host": "$.host"});
    let out = docpath::deref_recursive_with(&template, &values, |expr| {
        expr.replacen("$.", "$.env.prod.", 1)
    })
    .unwrap();
    assert_eq!(out, document!({"host": "db.prod"}));
}

// ── Engine with a custom registry ────────────────────────────────────────────

#[test]
fn test_engine_with_extended_registry() {
    let registry = FunctionRegistry::builtin().with("count", |doc, args| {
        vec![Document::from(aggregate::concat(doc, args).len())]
    });
    let engine = Engine::with_registry(registry);
    let doc = document!({"xs": [1, 2, 3], "ys": [4]});

    assert_eq!(
        engine.get(&doc, "COUNT($.xs[*], $.ys[*])", None).unwrap(),
        Some(document!([4]))
    );
    assert_eq!(engine.get(&doc, "concat($.ys[*])", None).unwrap(), Some(document!([4])));
    assert!(docpath::get(&doc, "count($.xs)", None).is_err());
}

#[test]
fn test_documents_round_trip_through_json() {
    let mut doc = Document::from_json_str(r#"{"a": {"b": [1, 2.5, "x", null]}}"#).unwrap();
    docpath::set(&mut doc, "$.a.c", "new").unwrap();
    assert_eq!(
        doc.to_json_string().unwrap(),
        r#"{"a":{"b":[1,2.5,"x",null],"c":"new"}}"#
    );
}
