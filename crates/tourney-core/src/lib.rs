//! Core types for tournaments.
//!
//! This crate provides the in-memory model shared by the storage backends and
//! the command layer:
//! - [`Team`] and [`MemberRef`] for named, append-only rosters
//! - [`Tournament`] for participant lists and the current bracket
//! - [`Match`] and [`Slot`] for single-elimination pairings
//! - [`RegistryState`], the combined team and tournament registries
//! - [`bracket`] for turning a participant list into a randomized bracket

pub mod bracket;
mod error;
mod member;
mod registry;
mod team;
mod tournament;

pub use bracket::{Match, Slot, BYE};
pub use error::{ErrorKind, RegistryError};
pub use member::MemberRef;
pub use registry::{RegistryState, TeamRegistry, TournamentRegistry};
pub use team::Team;
pub use tournament::Tournament;
