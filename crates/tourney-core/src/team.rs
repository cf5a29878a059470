//! Team roster.

use crate::MemberRef;

/// A named, append-only roster of members.
///
/// Members keep insertion order and may repeat; there is no removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Unique, case-sensitive team name.
    pub name: String,
    /// Members in the order they were added.
    pub members: Vec<MemberRef>,
}

impl Team {
    /// Creates a team with no members.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Creates a team with the given roster, as read back from storage.
    #[must_use]
    pub fn with_members(name: impl Into<String>, members: Vec<MemberRef>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    /// Returns true if the member appears on the roster at least once.
    #[must_use]
    pub fn has_member(&self, member: &MemberRef) -> bool {
        self.members.contains(member)
    }
}
