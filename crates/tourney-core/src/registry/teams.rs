//! Team registry.

use std::collections::BTreeMap;

use crate::{MemberRef, RegistryError, Team};

/// Teams keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeamRegistry {
    teams: BTreeMap<String, Team>,
}

impl TeamRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new team with an empty roster.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTeam`] if the name is taken, or
    /// [`RegistryError::EmptyIdentifier`] for an empty name.
    pub fn create(&mut self, name: &str) -> Result<&Team, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyIdentifier("team name"));
        }
        if self.teams.contains_key(name) {
            return Err(RegistryError::DuplicateTeam(name.to_string()));
        }
        let team = self
            .teams
            .entry(name.to_string())
            .or_insert_with(|| Team::new(name));
        Ok(&*team)
    }

    /// Appends a member to a team's roster. Repeats are kept.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TeamNotFound`] if the team does not exist.
    pub fn add_member(&mut self, name: &str, member: MemberRef) -> Result<&Team, RegistryError> {
        let team = self
            .teams
            .get_mut(name)
            .ok_or_else(|| RegistryError::TeamNotFound(name.to_string()))?;
        team.members.push(member);
        Ok(&*team)
    }

    /// Looks up a team by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.teams.contains_key(name)
    }

    /// Team names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.teams.keys().map(String::as_str)
    }

    /// All teams in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

/// Rebuilds a registry from stored teams. A later team with the same name
/// replaces an earlier one.
impl FromIterator<Team> for TeamRegistry {
    fn from_iter<I: IntoIterator<Item = Team>>(iter: I) -> Self {
        Self {
            teams: iter
                .into_iter()
                .map(|team| (team.name.clone(), team))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str) -> MemberRef {
        MemberRef::new(id).unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let mut teams = TeamRegistry::new();
        let created = teams.create("Alpha").unwrap().clone();
        assert_eq!(created, Team::new("Alpha"));
        assert_eq!(teams.get("Alpha"), Some(&created));
        assert_eq!(teams.get("alpha"), None);
    }

    #[test]
    fn test_create_duplicate_fails_and_keeps_one() {
        let mut teams = TeamRegistry::new();
        teams.create("Alpha").unwrap();
        teams.add_member("Alpha", member("u1")).unwrap();

        assert_eq!(
            teams.create("Alpha"),
            Err(RegistryError::DuplicateTeam("Alpha".into()))
        );
        assert_eq!(teams.len(), 1);
        assert_eq!(teams.get("Alpha").unwrap().members, vec![member("u1")]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut teams = TeamRegistry::new();
        teams.create("Alpha").unwrap();
        teams.create("alpha").unwrap();
        assert_eq!(teams.names().collect::<Vec<_>>(), vec!["Alpha", "alpha"]);
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let mut teams = TeamRegistry::new();
        assert_eq!(
            teams.create(""),
            Err(RegistryError::EmptyIdentifier("team name"))
        );
        assert!(teams.is_empty());
    }

    #[test]
    fn test_add_member_to_missing_team() {
        let mut teams = TeamRegistry::new();
        assert_eq!(
            teams.add_member("Ghost", member("u1")),
            Err(RegistryError::TeamNotFound("Ghost".into()))
        );
        assert!(teams.is_empty());
    }

    #[test]
    fn test_add_member_appends_and_allows_repeats() {
        let mut teams = TeamRegistry::new();
        teams.create("Alpha").unwrap();
        teams.add_member("Alpha", member("u1")).unwrap();
        teams.add_member("Alpha", member("u2")).unwrap();
        let team = teams.add_member("Alpha", member("u1")).unwrap();

        assert_eq!(team.members, vec![member("u1"), member("u2"), member("u1")]);
        assert!(team.has_member(&member("u2")));
    }

    #[test]
    fn test_from_iter() {
        let teams: TeamRegistry = vec![
            Team::with_members("Beta", vec![member("b")]),
            Team::new("Alpha"),
        ]
        .into_iter()
        .collect();

        assert_eq!(teams.names().collect::<Vec<_>>(), vec!["Alpha", "Beta"]);
        assert_eq!(teams.get("Beta").unwrap().members, vec![member("b")]);
    }
}
