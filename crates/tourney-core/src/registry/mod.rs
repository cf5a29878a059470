//! In-memory registries of teams and tournaments.

mod teams;
mod tournaments;

pub use teams::TeamRegistry;
pub use tournaments::TournamentRegistry;

use rand::Rng;

use crate::{Match, MemberRef, RegistryError, Team, Tournament};

/// The complete registry: every team and every tournament.
///
/// This is the unit that gets persisted. It is plain owned data; callers
/// that share it between tasks wrap it in their own lock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistryState {
    pub teams: TeamRegistry,
    pub tournaments: TournamentRegistry,
}

impl RegistryState {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from already-populated parts.
    #[must_use]
    pub fn from_parts(teams: TeamRegistry, tournaments: TournamentRegistry) -> Self {
        Self { teams, tournaments }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty() && self.tournaments.is_empty()
    }

    pub fn create_team(&mut self, name: &str) -> Result<&Team, RegistryError> {
        self.teams.create(name)
    }

    pub fn add_member(&mut self, team: &str, member: MemberRef) -> Result<&Team, RegistryError> {
        self.teams.add_member(team, member)
    }

    pub fn create_tournament(&mut self, name: &str) -> Result<&Tournament, RegistryError> {
        self.tournaments.create(name)
    }

    /// Adds a registered team to a tournament.
    pub fn add_team_to_tournament(
        &mut self,
        tournament: &str,
        team: &str,
    ) -> Result<&Tournament, RegistryError> {
        self.tournaments.add_team(&self.teams, tournament, team)
    }

    /// Regenerates the bracket of a tournament.
    pub fn generate_bracket<R: Rng + ?Sized>(
        &mut self,
        tournament: &str,
        rng: &mut R,
    ) -> Result<&[Match], RegistryError> {
        self.tournaments.generate_bracket(tournament, rng)
    }
}
