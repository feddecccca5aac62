//! Ordered predicate registries.
//!
//! A registry is an append-only list of `(predicate, implementation)` pairs
//! for one open family (parsers, printers, artifact kinds). Lookups scan in
//! registration order and return the first implementation whose predicate
//! accepts the candidate, so more specific entries must be registered before
//! more general ones.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Predicate deciding whether an entry handles a candidate.
pub type Predicate<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;

/// Handle returned by [`Registry::register`], used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

struct Entry<C: ?Sized, T> {
    id: RegistrationId,
    name: String,
    predicate: Predicate<C>,
    item: T,
}

/// Ordered list of candidate implementations for one family.
pub struct Registry<C: ?Sized, T> {
    entries: Vec<Entry<C, T>>,
    next_id: u64,
}

impl<C: ?Sized, T> Registry<C, T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Append an implementation. Later registrations are consulted last.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F, item: T) -> RegistrationId
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        let id = RegistrationId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            name: name.into(),
            predicate: Arc::new(predicate),
            item,
        });
        id
    }

    /// Remove one registration, returning its implementation.
    pub fn deregister(&mut self, id: RegistrationId) -> Option<T> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index).item)
    }

    /// Remove every registration with the given name. Returns how many went.
    pub fn deregister_named(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.name != name);
        before - self.entries.len()
    }

    /// First implementation whose predicate accepts `candidate`.
    pub fn find(&self, candidate: &C) -> Option<&T> {
        self.find_entry(candidate).map(|entry| &entry.item)
    }

    /// Like [`find`](Self::find), also returning the entry name.
    pub fn find_named(&self, candidate: &C) -> Option<(&str, &T)> {
        self.find_entry(candidate)
            .map(|entry| (entry.name.as_str(), &entry.item))
    }

    fn find_entry(&self, candidate: &C) -> Option<&Entry<C, T>> {
        self.entries
            .iter()
            .find(|entry| (entry.predicate)(candidate))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Entry names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: ?Sized, T> Default for Registry<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized, T> fmt::Debug for Registry<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// A registry shared across threads.
///
/// Written at startup (and occasionally by tests); read everywhere else.
/// `find` clones the implementation out so no lock is held while it runs,
/// which lets implementations re-enter the registry.
pub struct SharedRegistry<C: ?Sized, T> {
    inner: RwLock<Registry<C, T>>,
}

impl<C: ?Sized, T> SharedRegistry<C, T> {
    pub fn new(registry: Registry<C, T>) -> Self {
        Self {
            inner: RwLock::new(registry),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Registry<C, T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Registry<C, T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register<F>(&self, name: impl Into<String>, predicate: F, item: T) -> RegistrationId
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.write().register(name, predicate, item)
    }

    pub fn deregister(&self, id: RegistrationId) -> Option<T> {
        self.write().deregister(id)
    }

    pub fn deregister_named(&self, name: &str) -> usize {
        self.write().deregister_named(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.read().names().map(str::to_string).collect()
    }
}

impl<C: ?Sized, T: Clone> SharedRegistry<C, T> {
    pub fn find(&self, candidate: &C) -> Option<T> {
        self.read().find(candidate).cloned()
    }

    pub fn find_named(&self, candidate: &C) -> Option<(String, T)> {
        self.read()
            .find_named(candidate)
            .map(|(name, item)| (name.to_string(), item.clone()))
    }
}

impl<C: ?Sized, T> Default for SharedRegistry<C, T> {
    fn default() -> Self {
        Self::new(Registry::new())
    }
}

impl<C: ?Sized, T> fmt::Debug for SharedRegistry<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.read(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_first_match() {
        let mut registry: Registry<str, &str> = Registry::new();
        registry.register("passme", |v: &str| v == "passme", "pass");

        assert_eq!(registry.find("passme"), Some(&"pass"));
        assert_eq!(registry.find("other"), None);
    }

    #[test]
    fn test_registration_order_wins() {
        let mut registry: Registry<str, u8> = Registry::new();
        registry.register("specific", |v: &str| v.starts_with("ab"), 1);
        registry.register("general", |v: &str| v.starts_with('a'), 2);

        assert_eq!(registry.find("abc"), Some(&1));
        assert_eq!(registry.find("axe"), Some(&2));
        assert_eq!(registry.find_named("abc").map(|(n, _)| n), Some("specific"));
    }

    #[test]
    fn test_deregister_by_id() {
        let mut registry: Registry<str, u8> = Registry::new();
        let id = registry.register("any", |_: &str| true, 7);
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.deregister(id), Some(7));
        assert!(registry.is_empty());
        assert_eq!(registry.deregister(id), None);
        assert_eq!(registry.find("x"), None);
    }

    #[test]
    fn test_deregister_named() {
        let mut registry: Registry<str, u8> = Registry::new();
        registry.register("dup", |_: &str| true, 1);
        registry.register("keep", |_: &str| true, 2);
        registry.register("dup", |_: &str| true, 3);

        assert_eq!(registry.deregister_named("dup"), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["keep"]);
        assert!(!registry.contains("dup"));
    }

    #[test]
    fn test_sized_candidates() {
        let mut registry: Registry<i64, &str> = Registry::new();
        registry.register("negative", |v: &i64| *v < 0, "neg");
        assert_eq!(registry.find(&-3), Some(&"neg"));
        assert_eq!(registry.find(&3), None);
    }

    #[test]
    fn test_shared_registry_clones_out() {
        let shared: SharedRegistry<str, Arc<String>> = SharedRegistry::default();
        let id = shared.register("hello", |v: &str| v == "hi", Arc::new("hello".to_string()));

        let found = shared.find("hi").unwrap();
        assert_eq!(found.as_str(), "hello");
        assert_eq!(shared.names(), vec!["hello".to_string()]);

        assert!(shared.deregister(id).is_some());
        assert!(shared.find("hi").is_none());
    }
}
