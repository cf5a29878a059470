//! Registry error types.

use thiserror::Error;

/// Errors returned by registry operations.
///
/// Every variant is recoverable: the registry is left unchanged when an
/// operation fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("team '{0}' already exists")]
    DuplicateTeam(String),

    #[error("tournament '{0}' already exists")]
    DuplicateTournament(String),

    #[error("team '{0}' not found")]
    TeamNotFound(String),

    #[error("tournament '{0}' not found")]
    TournamentNotFound(String),

    #[error("at least 2 participants are needed to generate a bracket, got {count}")]
    InsufficientParticipants { count: usize },

    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),
}

/// Coarse classification of failures, used by callers that only care about
/// how to report an error rather than which entity it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateKey,
    NotFound,
    InsufficientParticipants,
    InvalidInput,
    IoFailure,
}

impl RegistryError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateTeam(_) | Self::DuplicateTournament(_) => ErrorKind::DuplicateKey,
            Self::TeamNotFound(_) | Self::TournamentNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientParticipants { .. } => ErrorKind::InsufficientParticipants,
            Self::EmptyIdentifier(_) => ErrorKind::InvalidInput,
        }
    }
}
