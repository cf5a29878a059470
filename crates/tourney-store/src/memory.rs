//! In-process store.

use std::sync::Mutex;

use tourney_core::RegistryState;

use crate::{PersistenceStore, StoreError};

/// Keeps the last saved state in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<RegistryState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `state`, as if it had been saved.
    #[must_use]
    pub fn with_state(state: RegistryState) -> Self {
        Self {
            saved: Mutex::new(Some(state)),
        }
    }

    /// Returns true until the first save.
    pub fn is_untouched(&self) -> bool {
        self.saved.lock().map(|saved| saved.is_none()).unwrap_or(false)
    }
}

impl PersistenceStore for MemoryStore {
    fn load(&self) -> Result<RegistryState, StoreError> {
        let saved = self.saved.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(saved.clone().unwrap_or_default())
    }

    fn save(&self, state: &RegistryState) -> Result<(), StoreError> {
        let mut saved = self.saved.lock().map_err(|_| StoreError::LockPoisoned)?;
        *saved = Some(state.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
