//! Component compiler - turns a definition into a live instance.
//!
//! 1. Compose mixins into a [`ComposedDefinition`]
//! 2. Build a `Defined` instance from the composed data, computed, methods
//!    and hooks
//! 3. Attach every composed watcher to the instance's data, with the live
//!    instance as the handler's receiver, and move to `Composed`
//! 4. Move to `Instantiated` and run the `Created` hooks

use tracing::debug;

use super::definition::ComponentDefinition;
use super::instance::ComponentInstance;
use super::mixin::{ComposedDefinition, compose};
use crate::error::Result;
use crate::types::{LifecycleHook, LifecycleState};

/// Compose and instantiate `definition`.
pub fn compile(definition: &ComponentDefinition) -> Result<ComponentInstance> {
    compile_composed(&compose(definition))
}

/// Instantiate an already composed definition.
pub fn compile_composed(composed: &ComposedDefinition) -> Result<ComponentInstance> {
    let instance = ComponentInstance::from_composed(composed);

    for (key, handler) in &composed.watch {
        // Released wholesale on destroy, so the token is not kept
        drop(instance.attach_watcher(key, handler.clone()));
    }
    instance.transition(LifecycleState::Composed)?;

    instance.transition(LifecycleState::Instantiated)?;
    debug!(
        instance = %instance.id(),
        component = instance.name().unwrap_or("<anonymous>"),
        watchers = composed.watch.len(),
        "component compiled"
    );

    instance.run_hooks(LifecycleHook::Created)?;
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::MixinDefinition;
    use crate::error::RuntimeError;
    use crate::types::{DataMap, Value};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn data_of(pairs: &[(&str, Value)]) -> DataMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_compiled_state() {
        let instance = compile(&ComponentDefinition::new("<p></p>")).unwrap();
        assert_eq!(instance.state(), LifecycleState::Instantiated);
        assert!(instance.is_alive());
    }

    #[test]
    fn test_host_wins_over_mixins() {
        let def = ComponentDefinition::new("")
            .with_data(|| data_of(&[("k", json!("host"))]))
            .mixin(MixinDefinition::new().with_data(|| data_of(&[("k", json!("m1"))])))
            .mixin(MixinDefinition::new().with_data(|| data_of(&[("k", json!("m2"))])));

        let instance = compile(&def).unwrap();
        assert_eq!(instance.get("k").unwrap(), json!("host"));
    }

    #[test]
    fn test_watch_fires_for_each_write_in_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let calls_clone = calls.clone();
        let def = ComponentDefinition::new("")
            .with_data(|| data_of(&[("k", json!(0))]))
            .watch("k", move |_, new, old| {
                calls_clone.borrow_mut().push((new.clone(), old.clone()));
                Ok(())
            });
        let instance = compile(&def).unwrap();

        instance.set("k", json!(1)).unwrap();
        assert_eq!(calls.borrow().len(), 1);
        instance.set("k", json!(2)).unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![(json!(1), json!(0)), (json!(2), json!(1))]
        );
    }

    #[test]
    fn test_mixin_watcher_binds_live_instance() {
        let seen = log();
        let seen_clone = seen.clone();
        let tracker = MixinDefinition::new().watch("query", move |this, new, _| {
            // The receiver is the composed instance, not the mixin
            let label = this.get("label")?;
            seen_clone.borrow_mut().push(format!("{label}:{new}"));
            Ok(())
        });
        let def = ComponentDefinition::new("")
            .with_data(|| data_of(&[("query", json!("")), ("label", json!("search"))]))
            .mixin(tracker);
        let instance = compile(&def).unwrap();

        instance.set("query", json!("rust")).unwrap();
        assert_eq!(*seen.borrow(), vec![r#""search":"rust""#.to_string()]);
    }

    #[test]
    fn test_mixin_watcher_runs_before_host_watcher() {
        let order = log();
        let (a, b) = (order.clone(), order.clone());
        let def = ComponentDefinition::new("")
            .with_data(|| data_of(&[("k", json!(0))]))
            .watch("k", move |_, _, _| {
                a.borrow_mut().push("host".into());
                Ok(())
            })
            .mixin(MixinDefinition::new().watch("k", move |_, _, _| {
                b.borrow_mut().push("mixin".into());
                Ok(())
            }));
        let instance = compile(&def).unwrap();

        instance.set("k", json!(1)).unwrap();
        assert_eq!(*order.borrow(), vec!["mixin", "host"]);
    }

    #[test]
    fn test_watcher_can_write_other_keys() {
        let def = ComponentDefinition::new("")
            .with_data(|| data_of(&[("celsius", json!(0)), ("fahrenheit", json!(32))]))
            .watch("celsius", |this, new, _| {
                let c = new.as_f64().unwrap_or(0.0);
                this.set("fahrenheit", json!(c * 9.0 / 5.0 + 32.0))
            });
        let instance = compile(&def).unwrap();

        instance.set("celsius", json!(100)).unwrap();
        assert_eq!(instance.get("fahrenheit").unwrap(), json!(212.0));
    }

    #[test]
    fn test_watcher_error_propagates_and_blocks_commit() {
        let def = ComponentDefinition::new("")
            .with_data(|| data_of(&[("age", json!(1))]))
            .watch("age", |_, new, _| {
                if new.as_i64().unwrap_or(0) < 0 {
                    return Err(RuntimeError::handler("age must be positive"));
                }
                Ok(())
            });
        let instance = compile(&def).unwrap();

        assert!(instance.set("age", json!(-5)).is_err());
        assert_eq!(instance.get("age").unwrap(), json!(1));
    }

    #[test]
    fn test_hook_order_through_destroy() {
        let order = log();
        let push = |order: &Log, label: &'static str| {
            let order = order.clone();
            move |_: &ComponentInstance| -> Result<()> {
                order.borrow_mut().push(label.to_string());
                Ok(())
            }
        };
        let def = ComponentDefinition::new("")
            .on(LifecycleHook::Created, push(&order, "created"))
            .on(LifecycleHook::BeforeDestroy, push(&order, "beforeDestroy"))
            .on(LifecycleHook::Destroyed, push(&order, "destroyed"))
            .mixin(MixinDefinition::new().on(LifecycleHook::Created, push(&order, "mixin created")));

        let instance = compile(&def).unwrap();
        instance.destroy().unwrap();

        assert_eq!(
            *order.borrow(),
            vec!["mixin created", "created", "beforeDestroy", "destroyed"]
        );
    }

    #[test]
    fn test_before_destroy_sees_live_instance() {
        let seen = log();
        let seen_clone = seen.clone();
        let def = ComponentDefinition::new("")
            .with_data(|| data_of(&[("k", json!("alive"))]))
            .on(LifecycleHook::BeforeDestroy, move |this| {
                seen_clone.borrow_mut().push(this.get("k")?.to_string());
                Ok(())
            })
            .on(LifecycleHook::Destroyed, |this| {
                assert!(matches!(this.get("k"), Err(RuntimeError::Destroyed(_))));
                Ok(())
            });

        compile(&def).unwrap().destroy().unwrap();
        assert_eq!(*seen.borrow(), vec![r#""alive""#.to_string()]);
    }

    #[test]
    fn test_destroy_silences_watchers() {
        let calls = Rc::new(RefCell::new(0));
        let calls_clone = calls.clone();
        let def = ComponentDefinition::new("")
            .with_data(|| data_of(&[("k", json!(0))]))
            .watch("k", move |_, _, _| {
                *calls_clone.borrow_mut() += 1;
                Ok(())
            });
        let instance = compile(&def).unwrap();
        assert_eq!(instance.watcher_count("k"), 1);

        instance.destroy().unwrap();
        assert_eq!(instance.watcher_count("k"), 0);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_each_compile_is_independent() {
        let def = ComponentDefinition::new("").with_data(|| data_of(&[("n", json!(0))]));
        let a = compile(&def).unwrap();
        let b = compile(&def).unwrap();

        a.set("n", json!(5)).unwrap();
        assert_eq!(b.get("n").unwrap(), json!(0));
        assert_ne!(a.id(), b.id());
    }
}
