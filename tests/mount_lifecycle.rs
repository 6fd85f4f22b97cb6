//! End-to-end mount lifecycle through the app container.
//!
//! Covers the full path a host application takes: install a catalog,
//! mount into a document, react to data changes, and tear down.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use zenithic::prelude::*;

type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// `<body><main id="app" class="shell"><p>stale</p></main></body>`
fn host_document() -> (Document, NodeId) {
    let mut doc = Document::new();
    let main = doc.create_element("main");
    doc.set_attribute(main, "id", "app").unwrap();
    doc.set_attribute(main, "class", "shell").unwrap();
    let body = doc.body();
    doc.append_child(body, main).unwrap();

    let stale = doc.create_element("p");
    let text = doc.create_text("stale");
    doc.append_child(stale, text).unwrap();
    doc.append_child(main, stale).unwrap();
    (doc, main)
}

/// A `v-once`-style directive that stamps its element once it is in the page.
fn stamp_directive(log: &Log) -> Directive {
    let on_mount = log.clone();
    let on_unbind = log.clone();
    Directive::new()
        .on(DirectiveHook::Mounted, move |doc, el, binding| {
            on_mount.borrow_mut().push(format!("stamp {}", binding.value_string()));
            doc.set_attribute(el, "data-stamp", &binding.value_string())
        })
        .on(DirectiveHook::BeforeDestroy, move |_, _, _| {
            on_unbind.borrow_mut().push("unstamp".to_string());
            Ok(())
        })
}

fn counter() -> ComponentDefinition {
    ComponentDefinition::new(r#"<button v-stamp="counter">{{ count }}</button>"#)
        .named("Counter")
        .with_data(|| [("count".to_string(), json!(0))].into_iter().collect())
        .computed("double", |this| {
            Ok(json!(this.get("count")?.as_i64().unwrap_or(0) * 2))
        })
        .method("increment", |this, _| {
            let next = this.get("count")?.as_i64().unwrap_or(0) + 1;
            this.set("count", json!(next))?;
            Ok(json!(next))
        })
        .with_render(|this, doc| {
            let button = doc.create_element("button");
            let label = format!("{}", this.get("count")?);
            let text = doc.create_text(&label);
            doc.append_child(button, text)?;
            Ok(button)
        })
}

#[test]
fn test_full_lifecycle() {
    let (mut doc, point) = host_document();
    let log = new_log();

    let mut app = App::new();
    app.use_plugin(
        Catalog::new()
            .component("Counter", counter())
            .directive("stamp", stamp_directive(&log)),
    );

    let instance = app
        .mount_component(&mut doc, "main.shell", "Counter", Props::new())
        .unwrap()
        .expect("mount point exists");

    let root = app.el().unwrap();
    assert_eq!(doc.children(point), &[root]);
    assert_eq!(doc.attribute(root, "data-stamp"), Some("counter"));
    assert_eq!(doc.to_html(point), r#"<main class="shell" id="app"><button data-stamp="counter">0</button></main>"#);

    assert_eq!(instance.call("increment", &[]).unwrap(), json!(1));
    assert_eq!(instance.get("double").unwrap(), json!(2));

    app.unmount(&mut doc).unwrap();
    assert!(doc.children(point).is_empty());
    assert!(!instance.is_alive());
    assert_eq!(*log.borrow(), vec!["stamp counter", "unstamp"]);
}

#[test]
fn test_unresolved_selector_leaves_document_alone() {
    let (mut doc, point) = host_document();
    let before = doc.to_html(point);
    let mut app = App::new();

    let mounted = app
        .mount(&mut doc, "#missing", &counter(), Props::new())
        .unwrap();

    assert!(mounted.is_none());
    assert_eq!(doc.to_html(point), before);
    assert!(app.instance().is_none());
}

#[test]
fn test_watchers_fire_while_mounted() {
    let (mut doc, _) = host_document();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    let def = counter().watch("count", move |_, new, old| {
        seen_clone.borrow_mut().push((new.clone(), old.clone()));
        Ok(())
    });

    let mut app = App::new();
    let instance = app.mount(&mut doc, "#app", &def, Props::new()).unwrap().unwrap();
    instance.call("increment", &[]).unwrap();
    instance.call("increment", &[]).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![(json!(1), json!(0)), (json!(2), json!(1))]
    );

    app.unmount(&mut doc).unwrap();
    assert!(matches!(instance.call("increment", &[]), Err(RuntimeError::Destroyed(_))));
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn test_signal_prop_tracks_source() {
    let (mut doc, _) = host_document();
    let title = spark_signals::signal(json!("Draft"));
    let mut props = Props::new();
    props.insert("title".into(), PropValue::from(title.clone()));

    let mut app = App::new();
    let instance = app
        .mount(&mut doc, "#app", &ComponentDefinition::new(""), props)
        .unwrap()
        .unwrap();

    assert_eq!(instance.get("title").unwrap(), json!("Draft"));
    title.set(json!("Final"));
    assert_eq!(instance.get("title").unwrap(), json!("Final"));
}

#[test]
fn test_catalog_filtered_by_config() {
    let config = AppConfig::from_json(r#"{ "directives": [] }"#).unwrap();
    let log = new_log();
    let mut app = App::with_config(config);
    app.use_plugin(
        Catalog::new()
            .component("Counter", counter())
            .directive("stamp", stamp_directive(&log)),
    );

    assert!(app.directive("stamp").is_none());

    let (mut doc, _) = host_document();
    app.mount_component(&mut doc, "#app", "Counter", Props::new())
        .unwrap()
        .unwrap();
    let root = app.el().unwrap();

    assert_eq!(doc.attribute(root, "data-stamp"), None);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_mixin_from_registry() {
    let (mut doc, _) = host_document();
    let mut app = App::new();
    app.register_mixin(
        "greeting",
        MixinDefinition::new()
            .with_data(|| [("greeting".to_string(), json!("hello"))].into_iter().collect())
            .method("greet", |this, args| {
                let name = args.first().and_then(Value::as_str).unwrap_or("world");
                Ok(json!(format!("{} {name}", this.get("greeting")?.as_str().unwrap_or(""))))
            }),
    );

    let def = ComponentDefinition::new("").mixin(app.mixin("greeting").unwrap());
    let instance = app.mount(&mut doc, "#app", &def, Props::new()).unwrap().unwrap();

    assert_eq!(instance.call("greet", &[json!("rust")]).unwrap(), json!("hello rust"));
}
