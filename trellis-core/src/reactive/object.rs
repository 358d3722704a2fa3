//! Reactive Objects
//!
//! An [`Object`] is a reactive container: an ordered map from key to
//! [`PropertyCell`]. Each cell owns the boxed value and the Dependency that
//! tracks who read it.
//!
//! # How Interception Works
//!
//! 1. Wrapping a JSON map converts each value first (so nested maps are
//!    wrapped bottom-up) and then installs one cell per key.
//!
//! 2. A read through a cell registers the active collector, if there is one,
//!    with the cell's Dependency.
//!
//! 3. A write compares the new value with the boxed one using strict
//!    equality. Equal writes stop there. Otherwise the value is stored and
//!    the Dependency notifies synchronously.
//!
//! Keys added after wrapping are plain fields: reading them subscribes
//! nothing and writing them notifies nobody.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::collector::Collector;
use super::dep::Dependency;
use super::value::Value;
use crate::error::Result;

/// The (key, boxed value, Dependency) triple installed for each wrapped key.
pub struct PropertyCell {
    key: String,
    value: RefCell<Value>,
    dep: Dependency,
}

impl PropertyCell {
    fn new(key: String, value: Value) -> Self {
        Self {
            key,
            value: RefCell::new(value),
            dep: Dependency::new(),
        }
    }

    /// Read the value, subscribing the active collector.
    pub fn get(&self) -> Value {
        if let Some(collector) = Collector::current() {
            self.dep.subscribe(collector);
        }
        self.value.borrow().clone()
    }

    /// Read the value without subscribing anything.
    pub fn get_untracked(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Store `value` and notify, unless it strictly equals the current value.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: Value) -> Result<bool> {
        if self.value.borrow().strict_eq(&value) {
            trace!(key = %self.key, "write ignored, value unchanged");
            return Ok(false);
        }

        *self.value.borrow_mut() = value;
        trace!(key = %self.key, dep = self.dep.id(), "property changed");
        self.dep.notify()?;
        Ok(true)
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dep
    }
}

enum Slot {
    Reactive(Rc<PropertyCell>),
    Plain(Value),
}

/// A reactive container. Cloning yields another handle to the same object.
#[derive(Clone)]
pub struct Object {
    fields: Rc<RefCell<IndexMap<String, Slot>>>,
}

impl Object {
    /// Create an empty object. Every key later assigned to it is plain.
    pub fn new() -> Self {
        Self {
            fields: Rc::new(RefCell::new(IndexMap::new())),
        }
    }

    /// Wrap a JSON map, making every key reactive, recursively.
    pub fn wrap(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut fields = IndexMap::with_capacity(map.len());
        for (key, json) in map {
            let value = Value::from(json);
            let cell = PropertyCell::new(key.clone(), value);
            fields.insert(key, Slot::Reactive(Rc::new(cell)));
        }
        debug!(keys = fields.len(), "wrapped object");
        Self {
            fields: Rc::new(RefCell::new(fields)),
        }
    }

    pub fn ptr_eq(a: &Object, b: &Object) -> bool {
        Rc::ptr_eq(&a.fields, &b.fields)
    }

    /// Read `key`, subscribing the active collector if the key is reactive.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.fields.borrow().get(key)? {
            Slot::Reactive(cell) => Some(cell.get()),
            Slot::Plain(value) => Some(value.clone()),
        }
    }

    /// Read `key` without subscribing anything.
    pub fn get_untracked(&self, key: &str) -> Option<Value> {
        match self.fields.borrow().get(key)? {
            Slot::Reactive(cell) => Some(cell.get_untracked()),
            Slot::Plain(value) => Some(value.clone()),
        }
    }

    /// Assign `key`.
    ///
    /// Reactive keys go through their cell's write guard and notify on
    /// change. Any other key is stored as a plain field. Returns whether the
    /// stored value changed.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();
        let cell = match self.fields.borrow().get(key) {
            Some(Slot::Reactive(cell)) => Some(Rc::clone(cell)),
            _ => None,
        };

        // The field map must not stay borrowed while subscribers run.
        if let Some(cell) = cell {
            return cell.set(value);
        }

        let mut fields = self.fields.borrow_mut();
        if let Some(Slot::Plain(current)) = fields.get(key) {
            if current.strict_eq(&value) {
                return Ok(false);
            }
        }
        trace!(key, "plain field assigned");
        fields.insert(key.to_string(), Slot::Plain(value));
        Ok(true)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.borrow().contains_key(key)
    }

    /// Whether `key` is backed by a reactive cell.
    pub fn is_reactive(&self, key: &str) -> bool {
        matches!(self.fields.borrow().get(key), Some(Slot::Reactive(_)))
    }

    pub fn keys(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.borrow().is_empty()
    }

    /// The cell behind `key`, if the key is reactive.
    pub fn cell(&self, key: &str) -> Option<Rc<PropertyCell>> {
        match self.fields.borrow().get(key)? {
            Slot::Reactive(cell) => Some(Rc::clone(cell)),
            Slot::Plain(_) => None,
        }
    }

    /// Number of subscriptions on `key`'s Dependency; zero for plain keys.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.cell(key).map_or(0, |cell| cell.dependency().len())
    }

    pub(crate) fn entries_untracked(&self) -> Vec<(String, Value)> {
        self.fields
            .borrow()
            .iter()
            .map(|(key, slot)| {
                let value = match slot {
                    Slot::Reactive(cell) => cell.get_untracked(),
                    Slot::Plain(value) => value.clone(),
                };
                (key.clone(), value)
            })
            .collect()
    }

    /// Plain JSON copy of the object, keys in insertion order.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries_untracked()
            .into_iter()
            .map(|(key, value)| (key, value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in self.entries_untracked() {
            map.entry(&key, &value);
        }
        map.finish()
    }
}

/// Wrap `data`, the entry point of property interception.
///
/// Objects become reactive at every depth. Anything else is returned as a
/// leaf value, which makes wrapping a non-container a no-op.
pub fn observe(data: serde_json::Value) -> Value {
    Value::from(data)
}
