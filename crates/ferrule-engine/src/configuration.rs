//! Named, ordered dependency sets.

use std::sync::{Arc, PoisonError, RwLock};

use crate::dependency::Dependency;

/// A named, ordered set of dependencies plus a transitivity flag.
///
/// `Configuration` is a handle: clones share the same underlying state, so a
/// dependency added through one clone is visible through every other. Resolved
/// views hold a clone and read the *current* dependency list on every query.
#[derive(Debug, Clone)]
pub struct Configuration {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    state: RwLock<State>,
}

#[derive(Debug)]
struct State {
    dependencies: Vec<Dependency>,
    transitive: bool,
}

impl Configuration {
    /// Create an empty, transitive configuration.
    pub fn new(name: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.to_owned(),
                state: RwLock::new(State {
                    dependencies: Vec::new(),
                    transitive: true,
                }),
            }),
        }
    }

    /// Builder form of [`Configuration::set_transitive`].
    pub fn with_transitive(self, transitive: bool) -> Self {
        self.set_transitive(transitive);
        self
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_transitive(&self) -> bool {
        self.read(|s| s.transitive)
    }

    pub fn set_transitive(&self, transitive: bool) {
        self.write(|s| s.transitive = transitive);
    }

    /// Append a dependency. Declaration order is preserved.
    pub fn add_dependency(&self, dependency: Dependency) {
        self.write(|s| s.dependencies.push(dependency));
    }

    /// A point-in-time copy of the dependency list, in declaration order.
    ///
    /// The copy is taken under a short read lock, so dependency hooks run
    /// against it without holding any lock on the configuration.
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.read(|s| s.dependencies.clone())
    }

    pub fn len(&self) -> usize {
        self.read(|s| s.dependencies.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two handles refer to the same configuration.
    pub fn same_as(&self, other: &Configuration) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // Every write is a single push or assignment, so a poisoned lock still
    // guards consistent state.
    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        let guard = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut State)) {
        let mut guard = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}
