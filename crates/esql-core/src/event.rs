//! Attribute lookup against the event under evaluation.
//!
//! The `Event` trait is the engine's only view of an event: a read-only
//! mapping from context-attribute name to a scalar [`Value`]. The event
//! model itself (which attributes are mandated by the event specification,
//! which are extensions, how the payload is carried) lives outside the
//! engine; implementations of this trait decide those questions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::eval::Value;

/// Read-only attribute lookup for one event.
pub trait Event: Send + Sync {
    /// Resolve a context-attribute name to its value.
    ///
    /// Returns `None` if the attribute is not set on this event.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Presence check for the `EXISTS` operator.
    ///
    /// Default implementation returns true if `attribute()` returns `Some`.
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// A simple event backed by a HashMap of attributes.
#[derive(Debug, Clone, Default)]
pub struct MapEvent {
    attributes: HashMap<String, Value>,
}

impl MapEvent {
    /// Create a new event with no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an event from an iterator of attributes.
    pub fn from_iter(attributes: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            attributes: attributes.into_iter().collect(),
        }
    }

    /// Set an attribute.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Number of attributes set.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl Event for MapEvent {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// Two-layer lookup: specification attributes first, then extensions.
///
/// Mirrors the lookup order filter evaluation promises: an extension
/// attribute can never shadow a specification attribute of the same name.
pub struct ChainedEvent<'a> {
    spec: &'a dyn Event,
    extensions: &'a dyn Event,
}

impl<'a> ChainedEvent<'a> {
    pub fn new(spec: &'a dyn Event, extensions: &'a dyn Event) -> Self {
        Self { spec, extensions }
    }
}

impl Event for ChainedEvent<'_> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.spec
            .attribute(name)
            .or_else(|| self.extensions.attribute(name))
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.spec.has_attribute(name) || self.extensions.has_attribute(name)
    }
}

/// An event with no attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyEvent;

impl EmptyEvent {
    pub fn new() -> Self {
        Self
    }
}

impl Event for EmptyEvent {
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    fn has_attribute(&self, _name: &str) -> bool {
        false
    }
}

impl<T: Event> Event for Arc<T> {
    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        (**self).has_attribute(name)
    }
}

impl<T: Event> Event for Box<T> {
    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        (**self).has_attribute(name)
    }
}

impl<T: Event + ?Sized> Event for &T {
    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        (**self).has_attribute(name)
    }
}
