//! Reactive data - The observable key → value store behind a component.
//!
//! Every key is backed by an [`Observable`]. Watching a key binds a change
//! handler to it; [`ReactiveData::release`] detaches every handler on every
//! key and leaves plain storage holding the last committed values.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::trace;

use super::observable::{Observable, Subscription};
use crate::error::Result;
use crate::types::{DataMap, Value};

/// Observable data object of a component instance.
#[derive(Debug, Default)]
pub struct ReactiveData {
    slots: RefCell<BTreeMap<String, Observable<Value>>>,
}

impl ReactiveData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a plain mapping. No key is watched yet.
    pub fn from_map(map: DataMap) -> Self {
        let slots = map
            .into_iter()
            .map(|(key, value)| (key, Observable::new(value)))
            .collect();
        Self {
            slots: RefCell::new(slots),
        }
    }

    fn slot(&self, key: &str) -> Option<Observable<Value>> {
        self.slots.borrow().get(key).cloned()
    }

    fn slot_or_insert(&self, key: &str) -> Observable<Value> {
        self.slots
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| Observable::new(Value::Null))
            .clone()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.slot(key).map(|slot| slot.get())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.borrow().contains_key(key)
    }

    /// Write `key`, running its watchers synchronously before the commit.
    ///
    /// Writing an unknown key creates it as plain, unwatched storage.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        match self.slot(key) {
            Some(slot) => slot.set(value),
            None => {
                self.slots
                    .borrow_mut()
                    .insert(key.to_string(), Observable::new(value));
                Ok(())
            }
        }
    }

    /// Bind `handler` to writes of `key`. An absent key is installed as `Null`.
    pub fn watch<F>(&self, key: &str, handler: F) -> Subscription
    where
        F: Fn(&Value, &Value) -> Result<()> + 'static,
    {
        trace!(key, "watcher attached");
        self.slot_or_insert(key).subscribe(handler)
    }

    pub fn watcher_count(&self, key: &str) -> usize {
        self.slot(key).map_or(0, |slot| slot.subscriber_count())
    }

    /// Detach every watcher on every key. Safe to call repeatedly.
    ///
    /// Returns the number of handlers removed.
    pub fn release(&self) -> usize {
        let slots: Vec<Observable<Value>> = self.slots.borrow().values().cloned().collect();
        let released = slots.iter().map(|slot| slot.clear_subscribers()).sum();
        trace!(released, "watchers released");
        released
    }

    pub fn keys(&self) -> Vec<String> {
        self.slots.borrow().keys().cloned().collect()
    }

    /// Plain copy of the current values.
    pub fn snapshot(&self) -> DataMap {
        self.slots
            .borrow()
            .iter()
            .map(|(key, slot)| (key.clone(), slot.get()))
            .collect()
    }

    /// Drop every key. Watchers must be released first.
    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn data() -> ReactiveData {
        let mut map = DataMap::new();
        map.insert("count".into(), json!(0));
        map.insert("label".into(), json!("idle"));
        ReactiveData::from_map(map)
    }

    #[test]
    fn test_plain_reads_and_writes() {
        let data = data();
        assert_eq!(data.get("count"), Some(json!(0)));
        data.set("count", json!(4)).unwrap();
        assert_eq!(data.get("count"), Some(json!(4)));
        assert_eq!(data.get("missing"), None);
    }

    #[test]
    fn test_set_unknown_key_creates_it() {
        let data = data();
        data.set("extra", json!(true)).unwrap();
        assert_eq!(data.get("extra"), Some(json!(true)));
        assert_eq!(data.watcher_count("extra"), 0);
    }

    #[test]
    fn test_watch_receives_each_assignment() {
        let data = data();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let calls_clone = calls.clone();

        let _sub = data.watch("count", move |new, old| {
            calls_clone.borrow_mut().push((new.clone(), old.clone()));
            Ok(())
        });

        data.set("count", json!(1)).unwrap();
        data.set("count", json!(2)).unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![(json!(1), json!(0)), (json!(2), json!(1))]
        );
    }

    #[test]
    fn test_watch_absent_key_installs_null() {
        let data = data();
        let _sub = data.watch("later", |_, _| Ok(()));
        assert_eq!(data.get("later"), Some(Value::Null));
        assert_eq!(data.watcher_count("later"), 1);
    }

    #[test]
    fn test_release_silences_all_keys() {
        let data = data();
        let count = Rc::new(Cell::new(0));

        for key in ["count", "label"] {
            let count = count.clone();
            let _sub = data.watch(key, move |_, _| {
                count.set(count.get() + 1);
                Ok(())
            });
        }

        assert_eq!(data.release(), 2);
        data.set("count", json!(9)).unwrap();
        data.set("label", json!("busy")).unwrap();

        assert_eq!(count.get(), 0);
        // Last observed values survive the release
        assert_eq!(data.get("count"), Some(json!(9)));
        assert_eq!(data.get("label"), Some(json!("busy")));
    }

    #[test]
    fn test_release_is_idempotent() {
        let data = data();
        let _sub = data.watch("count", |_, _| Ok(()));
        assert_eq!(data.release(), 1);
        assert_eq!(data.release(), 0);
    }

    #[test]
    fn test_snapshot() {
        let data = data();
        data.set("count", json!(3)).unwrap();
        let snapshot = data.snapshot();
        assert_eq!(snapshot.get("count"), Some(&json!(3)));
        assert_eq!(snapshot.len(), 2);
    }
}
