//! Single-flight slot.
//!
//! One caller (the leader) runs an expensive computation while every other
//! caller interested in the same outcome parks on the slot. The leader lands
//! exactly one outcome and all parked callers receive a clone of it.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use salesdex_core::StoreError;

pub(crate) struct Flight<T> {
    outcome: Mutex<Option<T>>,
    landed: Condvar,
}

impl<T: Clone> Flight<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(None),
            landed: Condvar::new(),
        })
    }

    /// Publish the outcome and wake every waiter. Only the first landing counts.
    pub(crate) fn land(&self, outcome: T) {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(outcome);
        }
        drop(slot);
        self.landed.notify_all();
    }

    /// Block until the leader lands an outcome.
    pub(crate) fn wait(&self) -> Result<T, StoreError> {
        let mut slot = self.outcome.lock().map_err(|_| StoreError::LockPoisoned)?;
        loop {
            if let Some(outcome) = slot.as_ref() {
                return Ok(outcome.clone());
            }
            slot = self
                .landed
                .wait(slot)
                .map_err(|_| StoreError::LockPoisoned)?;
        }
    }
}
