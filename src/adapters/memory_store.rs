//! In-memory storage adapter.
//!
//! Implements [`StoragePort`] over a shared `HashMap`, keyed by
//! `"namespace::key"`.  Clones share the same backing map, so a test can
//! keep a handle, hand a clone to the controller, and later inspect (or
//! re-open) what was saved.  Write failures can be injected to exercise
//! the controller's save-failure path.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::app::ports::{StorageError, StoragePort};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    store: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{namespace}::{key}")
    }

    /// Make every subsequent `set` fail with [`StorageError::IoError`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Raw access for tests: the stored value, if any.
    pub fn raw(&self, namespace: &str, key: &str) -> Option<String> {
        self.store
            .borrow()
            .get(&Self::composite_key(namespace, key))
            .cloned()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }
}

impl StoragePort for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(namespace, key))
    }

    fn set(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::IoError);
        }
        self.store
            .borrow_mut()
            .insert(Self::composite_key(namespace, key), value.to_owned());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store
            .borrow_mut()
            .remove(&Self::composite_key(namespace, key));
        Ok(())
    }
}
