//! Single-elimination bracket generation.
//!
//! A bracket is built by shuffling a copy of the participant list and then
//! pairing entrants from the end of the shuffled list. With an odd entrant
//! count the last remaining entrant is paired with [`Slot::Bye`].
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use tourney_core::bracket;
//!
//! let entrants = vec!["A".to_string(), "B".to_string(), "C".to_string()];
//! let matches = bracket::generate(&entrants, &mut StdRng::seed_from_u64(7)).unwrap();
//! assert_eq!(matches.len(), 2);
//! assert_eq!(entrants, ["A", "B", "C"]);
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::RegistryError;

/// Display text for a bye slot.
pub const BYE: &str = "BYE";

/// One side of a match.
///
/// Serialized as the team name, or `null` for a bye, so that a team that is
/// literally called "BYE" is never confused with an empty slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Slot {
    /// A participant team, by name.
    Team(String),
    /// No opponent.
    Bye,
}

impl Slot {
    /// Returns the team name, or `None` for a bye.
    #[must_use]
    pub fn team(&self) -> Option<&str> {
        match self {
            Self::Team(name) => Some(name),
            Self::Bye => None,
        }
    }

    #[must_use]
    pub fn is_bye(&self) -> bool {
        matches!(self, Self::Bye)
    }
}

impl From<Option<String>> for Slot {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Bye, Self::Team)
    }
}

impl From<Slot> for Option<String> {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Team(name) => Some(name),
            Slot::Bye => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team(name) => f.write_str(name),
            Self::Bye => f.write_str(BYE),
        }
    }
}

/// An ordered pairing of two slots. Serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match(Slot, Slot);

impl Match {
    /// Creates a match from its two slots.
    #[must_use]
    pub fn new(a: Slot, b: Slot) -> Self {
        Self(a, b)
    }

    #[must_use]
    pub fn slot_a(&self) -> &Slot {
        &self.0
    }

    #[must_use]
    pub fn slot_b(&self) -> &Slot {
        &self.1
    }

    /// Returns both slots in order.
    #[must_use]
    pub fn slots(&self) -> [&Slot; 2] {
        [&self.0, &self.1]
    }

    /// Returns true if either side is a bye.
    #[must_use]
    pub fn has_bye(&self) -> bool {
        self.0.is_bye() || self.1.is_bye()
    }

    /// Returns true if the named team plays in this match.
    #[must_use]
    pub fn involves(&self, team: &str) -> bool {
        self.slots().iter().any(|slot| slot.team() == Some(team))
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.0, self.1)
    }
}

/// Generates a randomized single-elimination bracket.
///
/// The input slice is not reordered; shuffling happens on a copy.
///
/// # Errors
///
/// Returns [`RegistryError::InsufficientParticipants`] when fewer than two
/// participants are given.
pub fn generate<R: Rng + ?Sized>(
    participants: &[String],
    rng: &mut R,
) -> Result<Vec<Match>, RegistryError> {
    if participants.len() < 2 {
        return Err(RegistryError::InsufficientParticipants {
            count: participants.len(),
        });
    }

    let mut shuffled = participants.to_vec();
    shuffled.shuffle(rng);
    Ok(pair_from_end(shuffled))
}

/// Pairs an already permuted list by repeatedly taking its last two entries.
///
/// A single leftover entry is paired with a bye. This is the deterministic
/// half of [`generate`].
#[must_use]
pub fn pair_from_end(mut permuted: Vec<String>) -> Vec<Match> {
    let mut matches = Vec::with_capacity(permuted.len().div_ceil(2));

    while permuted.len() >= 2 {
        // Both pops are infallible with len >= 2.
        let (Some(first), Some(second)) = (permuted.pop(), permuted.pop()) else {
            break;
        };
        matches.push(Match::new(Slot::Team(first), Slot::Team(second)));
    }

    if let Some(last) = permuted.pop() {
        matches.push(Match::new(Slot::Team(last), Slot::Bye));
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn team(name: &str) -> Slot {
        Slot::Team(name.to_string())
    }

    fn all_slots(matches: &[Match]) -> Vec<Slot> {
        let mut slots: Vec<Slot> = matches
            .iter()
            .flat_map(|m| [m.slot_a().clone(), m.slot_b().clone()])
            .collect();
        slots.sort_by_key(|s| s.to_string());
        slots
    }

    #[test]
    fn test_pair_from_end_even() {
        let matches = pair_from_end(names(&["A", "B", "C", "D"]));
        assert_eq!(
            matches,
            vec![
                Match::new(team("D"), team("C")),
                Match::new(team("B"), team("A")),
            ]
        );
    }

    #[test]
    fn test_pair_from_end_odd_gets_bye() {
        let matches = pair_from_end(names(&["A", "B", "C"]));
        assert_eq!(
            matches,
            vec![
                Match::new(team("C"), team("B")),
                Match::new(team("A"), Slot::Bye),
            ]
        );
    }

    #[test]
    fn test_generate_rejects_single_participant() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate(&names(&["A"]), &mut rng),
            Err(RegistryError::InsufficientParticipants { count: 1 })
        );
        assert_eq!(
            generate(&[], &mut rng),
            Err(RegistryError::InsufficientParticipants { count: 0 })
        );
    }

    #[test]
    fn test_generate_three_has_one_bye_for_many_seeds() {
        let entrants = names(&["A", "B", "C"]);
        for seed in 0..200 {
            let matches = generate(&entrants, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(matches.len(), 2);
            assert_eq!(matches.iter().filter(|m| m.has_bye()).count(), 1);
            assert_eq!(
                all_slots(&matches),
                vec![team("A"), team("B"), Slot::Bye, team("C")]
            );
        }
    }

    #[test]
    fn test_generate_four_has_no_bye() {
        let entrants = names(&["A", "B", "C", "D"]);
        for seed in 0..200 {
            let matches = generate(&entrants, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(matches.len(), 2);
            assert!(matches.iter().all(|m| !m.has_bye()));
            assert_eq!(
                all_slots(&matches),
                vec![team("A"), team("B"), team("C"), team("D")]
            );
        }
    }

    #[test]
    fn test_generate_does_not_reorder_input() {
        let entrants = names(&["A", "B", "C", "D", "E"]);
        let before = entrants.clone();
        let _ = generate(&entrants, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(entrants, before);
    }

    #[test]
    fn test_generate_is_reproducible_with_same_seed() {
        let entrants = names(&["A", "B", "C", "D", "E", "F"]);
        let first = generate(&entrants, &mut StdRng::seed_from_u64(9)).unwrap();
        let second = generate(&entrants, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_match_helpers() {
        let m = Match::new(team("Alpha"), Slot::Bye);
        assert!(m.has_bye());
        assert!(m.involves("Alpha"));
        assert!(!m.involves("BYE"));
        assert_eq!(m.to_string(), "Alpha vs BYE");
    }

    proptest! {
        #[test]
        fn prop_every_entrant_appears_once(
            entrants in prop::collection::vec("[a-z]{1,6}", 2..40),
            seed in any::<u64>(),
        ) {
            let matches = generate(&entrants, &mut StdRng::seed_from_u64(seed)).unwrap();

            prop_assert_eq!(matches.len(), entrants.len().div_ceil(2));

            let mut seen: Vec<String> = matches
                .iter()
                .flat_map(|m| m.slots())
                .filter_map(|s| s.team().map(str::to_string))
                .collect();
            let mut expected = entrants.clone();
            seen.sort();
            expected.sort();
            prop_assert_eq!(seen, expected);

            let byes = matches.iter().filter(|m| m.has_bye()).count();
            prop_assert_eq!(byes, entrants.len() % 2);
        }

        #[test]
        fn prop_bye_is_only_in_last_match(
            entrants in prop::collection::vec("[A-Z]{1,4}", 2..25),
            seed in any::<u64>(),
        ) {
            let matches = generate(&entrants, &mut StdRng::seed_from_u64(seed)).unwrap();
            let (last, rest) = matches.split_last().unwrap();
            prop_assert!(rest.iter().all(|m| !m.has_bye()));
            prop_assert_eq!(last.slot_b().is_bye(), entrants.len() % 2 == 1);
            prop_assert!(!last.slot_a().is_bye());
        }
    }
}
