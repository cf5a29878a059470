//! Durable storage for the tournament registry.
//!
//! Every backend saves and loads the *whole* [`RegistryState`]; there are no
//! partial updates. A store that has never been written loads as an empty
//! registry.
//!
//! # Backends
//!
//! - [`JsonStore`] - two JSON files in a directory (the default)
//! - [`SqliteStore`] - a single SQLite database
//! - [`MemoryStore`] - process-local, for tests and throwaway sessions

mod error;
mod json;
mod memory;
mod sqlite;

pub use error::StoreError;
pub use json::JsonStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use tourney_core::RegistryState;

/// Load/save contract shared by all backends.
///
/// `load(save(state)) == state` holds for every state, brackets included.
pub trait PersistenceStore: Send + Sync {
    /// Reads the full registry. Missing backing storage yields an empty one.
    fn load(&self) -> Result<RegistryState, StoreError>;

    /// Overwrites durable storage with `state`.
    fn save(&self, state: &RegistryState) -> Result<(), StoreError>;

    /// Short human-readable location, used in log lines.
    fn describe(&self) -> String;
}
