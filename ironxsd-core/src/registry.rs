//! Name-keyed constructors for polymorphic deserialization.

use crate::serializable::XmlSerializable;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Factory producing a fresh default instance.
pub type Constructor = Arc<dyn Fn() -> Box<dyn XmlSerializable> + Send + Sync>;

/// Maps element names and type names to constructors.
///
/// The registry also records substitution group membership, so readers
/// of list-like content can ask whether an element may stand in for a
/// head element.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    by_element: HashMap<String, Constructor>,
    by_type: HashMap<String, Constructor>,
    element_types: HashMap<String, String>,
    substitutes: HashMap<String, Vec<String>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under both an element name and a type name.
    ///
    /// Re-registering a name replaces the earlier constructor.
    pub fn register<F>(
        &mut self,
        element_name: impl Into<String>,
        type_name: impl Into<String>,
        constructor: F,
    ) where
        F: Fn() -> Box<dyn XmlSerializable> + Send + Sync + 'static,
    {
        let element_name = element_name.into();
        let type_name = type_name.into();
        let constructor: Constructor = Arc::new(constructor);

        if self.by_element.contains_key(&element_name) || self.by_type.contains_key(&type_name) {
            debug!(
                element = %element_name,
                type_name = %type_name,
                "replacing registered constructor"
            );
        }

        self.by_element
            .insert(element_name.clone(), Arc::clone(&constructor));
        self.by_type.insert(type_name.clone(), constructor);
        self.element_types.insert(element_name, type_name);
    }

    /// Registers `T` under the names reported by its default instance.
    pub fn register_type<T: XmlSerializable + Default>(&mut self) {
        let probe = T::default();
        let element_name = probe.element_name().to_string();
        let type_name = probe.type_name().to_string();
        self.register(element_name, type_name, || {
            Box::new(T::default()) as Box<dyn XmlSerializable>
        });
    }

    /// Creates an instance for an element name.
    #[must_use]
    pub fn create_by_element(&self, element_name: &str) -> Option<Box<dyn XmlSerializable>> {
        self.by_element.get(element_name).map(|ctor| ctor())
    }

    /// Creates an instance for a type name.
    #[must_use]
    pub fn create_by_type(&self, type_name: &str) -> Option<Box<dyn XmlSerializable>> {
        self.by_type.get(type_name).map(|ctor| ctor())
    }

    /// Returns the type name registered for an element.
    #[must_use]
    pub fn type_name_for_element(&self, element_name: &str) -> Option<&str> {
        self.element_types.get(element_name).map(String::as_str)
    }

    /// Records `member` as a substitute for `head`.
    pub fn register_substitute(&mut self, member: impl Into<String>, head: impl Into<String>) {
        let member = member.into();
        let members = self.substitutes.entry(head.into()).or_default();
        if !members.contains(&member) {
            members.push(member);
        }
    }

    /// Returns the direct substitutes of `head` in registration order.
    #[must_use]
    pub fn substitutes_of(&self, head: &str) -> &[String] {
        self.substitutes
            .get(head)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns true if `element` is `head` or may substitute for it,
    /// directly or through a chain of groups.
    #[must_use]
    pub fn is_substitutable(&self, element: &str, head: &str) -> bool {
        if element == head {
            return true;
        }
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([head]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for member in self.substitutes_of(current) {
                if member == element {
                    return true;
                }
                queue.push_back(member.as_str());
            }
        }
        false
    }

    /// Returns the number of registered element names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_element.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_element.is_empty()
    }

    /// Returns true if an element name is registered.
    #[must_use]
    pub fn contains_element(&self, element_name: &str) -> bool {
        self.by_element.contains_key(element_name)
    }

    /// Returns true if a type name is registered.
    #[must_use]
    pub fn contains_type(&self, type_name: &str) -> bool {
        self.by_type.contains_key(type_name)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut elements: Vec<_> = self.element_types.iter().collect();
        elements.sort();
        f.debug_struct("TypeRegistry")
            .field("elements", &elements)
            .field("substitutes", &self.substitutes)
            .finish()
    }
}
