// Walkthrough of reading, writing and resolving documents
//
// Run with logging:
//   RUST_LOG=docpath=debug cargo run --example engine_demo

use docpath::functions::{aggregate, FunctionRegistry};
use docpath::{document, Document, Engine, EngineError, Fallback};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), EngineError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== docpath demo ===\n");

    demo_get()?;
    demo_set()?;
    demo_templates()?;
    demo_custom_functions()?;

    Ok(())
}

fn show(label: &str, value: Option<Document>) {
    match value {
        Some(v) => println!("  {label:<40} => {v}"),
        None => println!("  {label:<40} => (nothing)"),
    }
}

fn demo_get() -> Result<(), EngineError> {
    println!("--- get ---");
    let doc = document!({
        "store": {
            "book": [
                {"title": "Sayings", "author": "Rees", "price": 8.95},
                {"title": "Sword", "author": "Waugh", "price": 12.99},
                {"title": "Moby Dick", "author": "Melville", "price": 8.99}
            ],
            "bicycle": {"color": "red", "price": 19.95}
        }
    });

    for path in [
        "$.store.bicycle.color",
        "$.store.book[-1].title",
        "concat($.store.book[*].author)",
        "uniq($..price)",
        "keys($.store.bicycle)",
    ] {
        show(path, docpath::get(&doc, path, None)?);
    }

    show(
        "$.store.map (literal default)",
        docpath::get(&doc, "$.store.map", Some(Fallback::from(document!("none"))))?,
    );
    let reference = Fallback::from(docpath::reference("$.store.book[0:2].title")?);
    show("$.store.map (reference default)", docpath::get(&doc, "$.store.map", Some(reference))?);
    println!();
    Ok(())
}

fn demo_set() -> Result<(), EngineError> {
    println!("--- set ---");
    let mut doc = document!({});
    docpath::set(&mut doc, "$.server.http.port", 8080)?;
    docpath::set(&mut doc, "$.server.http.host", "localhost")?;
    docpath::set(&mut doc, "$.server", document!({"tls": false}))?;
    println!("  built: {doc}");

    let mut doc = document!({"users": [{"name": "ada"}, {"name": "alan"}]});
    docpath::set(&mut doc, "$.users[*].active", true)?;
    println!("  every user: {doc}");

    if let Err(e) = docpath::set(&mut doc, "$.users[5]", 1) {
        println!("  refused: {e}");
    }
    println!();
    Ok(())
}

fn demo_templates() -> Result<(), EngineError> {
    println!("--- deref_recursive ---");
    let values = document!({
        "env": {"prod": {"db": "db.prod", "replicas": ["a", "b"]}},
        "owner": "ops"
    });
    let template = document!({
        "database": "$.db",
        "replicas": "concat($.replicas[*])",
        "static": ["$.db", "left alone"]
    });

    let resolved = docpath::deref_recursive_with(&template, &values, |expr| {
        expr.replace("$.", "$.env.prod.")
    })?;
    println!("  {resolved}\n");
    Ok(())
}

fn demo_custom_functions() -> Result<(), EngineError> {
    println!("--- custom registry ---");
    let registry = FunctionRegistry::builtin().with("count", |doc, args| {
        vec![Document::from(aggregate::concat(doc, args).len())]
    });
    let engine = Engine::with_registry(registry);
    let doc = document!({"xs": [1, 2, 3, 2]});

    show("count($.xs[*])", engine.get(&doc, "count($.xs[*])", None)?);
    match engine.get(&doc, "median($.xs[*])", None) {
        Ok(v) => show("median($.xs[*])", v),
        Err(e) => println!("  {:<40} => error: {e}", "median($.xs[*])"),
    }
    Ok(())
}
