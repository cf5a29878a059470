//! Tournament registry.

use rand::Rng;
use std::collections::BTreeMap;

use crate::bracket;
use crate::{Match, RegistryError, TeamRegistry, Tournament};

/// Tournaments keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TournamentRegistry {
    tournaments: BTreeMap<String, Tournament>,
}

impl TournamentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new tournament with no participants and no bracket.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTournament`] if the name is taken, or
    /// [`RegistryError::EmptyIdentifier`] for an empty name.
    pub fn create(&mut self, name: &str) -> Result<&Tournament, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyIdentifier("tournament name"));
        }
        if self.tournaments.contains_key(name) {
            return Err(RegistryError::DuplicateTournament(name.to_string()));
        }
        let tournament = self
            .tournaments
            .entry(name.to_string())
            .or_insert_with(|| Tournament::new(name));
        Ok(&*tournament)
    }

    /// Appends a team name to a tournament's participants.
    ///
    /// The team must exist in `teams` at call time. It is not re-checked
    /// later, and the same team may be added more than once.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TournamentNotFound`] first, then
    /// [`RegistryError::TeamNotFound`].
    pub fn add_team(
        &mut self,
        teams: &TeamRegistry,
        tournament: &str,
        team: &str,
    ) -> Result<&Tournament, RegistryError> {
        let entry = self
            .tournaments
            .get_mut(tournament)
            .ok_or_else(|| RegistryError::TournamentNotFound(tournament.to_string()))?;
        if !teams.contains(team) {
            return Err(RegistryError::TeamNotFound(team.to_string()));
        }
        entry.participants.push(team.to_string());
        Ok(&*entry)
    }

    /// Replaces a tournament's bracket with a freshly generated one.
    ///
    /// On error the previous bracket is left as it was.
    pub fn generate_bracket<R: Rng + ?Sized>(
        &mut self,
        tournament: &str,
        rng: &mut R,
    ) -> Result<&[Match], RegistryError> {
        let entry = self
            .tournaments
            .get_mut(tournament)
            .ok_or_else(|| RegistryError::TournamentNotFound(tournament.to_string()))?;
        entry.bracket = bracket::generate(&entry.participants, rng)?;
        Ok(&entry.bracket)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tournament> {
        self.tournaments.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tournaments.contains_key(name)
    }

    /// Tournament names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tournaments.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tournament> {
        self.tournaments.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tournaments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tournaments.is_empty()
    }
}

impl FromIterator<Tournament> for TournamentRegistry {
    fn from_iter<I: IntoIterator<Item = Tournament>>(iter: I) -> Self {
        Self {
            tournaments: iter
                .into_iter()
                .map(|tournament| (tournament.name.clone(), tournament))
                .collect(),
        }
    }
}
