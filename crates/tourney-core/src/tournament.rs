//! Tournament entrants and bracket.

use crate::{Match, TeamRegistry};

/// A named tournament.
///
/// `participants` holds team names, not copies of the teams. A name may
/// outlive the team it refers to; see [`Tournament::missing_participants`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tournament {
    /// Unique tournament name.
    pub name: String,
    /// Entrant team names in the order they were added. Duplicates allowed.
    pub participants: Vec<String>,
    /// Current bracket. Empty until the first generation.
    pub bracket: Vec<Match>,
}

impl Tournament {
    /// Creates a tournament with no participants and no bracket.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            participants: Vec::new(),
            bracket: Vec::new(),
        }
    }

    /// Returns true once a bracket has been generated.
    #[must_use]
    pub fn has_bracket(&self) -> bool {
        !self.bracket.is_empty()
    }

    /// Lists participant names that no longer resolve to a registered team.
    #[must_use]
    pub fn missing_participants<'a>(&'a self, teams: &TeamRegistry) -> Vec<&'a str> {
        self.participants
            .iter()
            .filter(|name| !teams.contains(name))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let cup = Tournament::new("Cup");
        assert_eq!(cup.name, "Cup");
        assert!(cup.participants.is_empty());
        assert!(!cup.has_bracket());
    }

    #[test]
    fn test_missing_participants() {
        let mut teams = TeamRegistry::default();
        teams.create("Alpha").unwrap();

        let mut cup = Tournament::new("Cup");
        cup.participants = vec!["Alpha".into(), "Gone".into(), "Alpha".into()];

        assert_eq!(cup.missing_participants(&teams), vec!["Gone"]);
    }
}
