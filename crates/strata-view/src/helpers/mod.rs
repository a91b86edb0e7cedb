//! Named helpers available to every template.
//!
//! Helpers are [`minijinja::value::Object`] implementations registered once
//! when the view is built. Templates reach them by name (`{{ Text.tail(x) }}`)
//! and Rust code can get them back with their concrete type through
//! [`HelperRegistry::get_as`].

mod text;

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::value::Object;
use minijinja::Value;

pub use text::{auto_paragraph, excerpt, highlight, tail, to_list, truncate, TextHelper};

#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    helpers: BTreeMap<String, Value>,
}

impl HelperRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in helpers (`Text`).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("Text", TextHelper);
        registry
    }

    /// Registers `helper` under `name`, replacing any previous helper.
    pub fn register<T: Object + 'static>(&mut self, name: impl Into<String>, helper: T) {
        self.helpers.insert(name.into(), Value::from_object(helper));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.helpers.get(name)
    }

    /// Returns the helper registered under `name` if it has type `T`.
    pub fn get_as<T: Object + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.helpers.get(name)?.downcast_object::<T>()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.helpers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}
