//! Member identifiers.

use std::fmt;

use crate::RegistryError;

/// A stable reference to a chat-platform member.
///
/// Only the identifier is stored. Display metadata is resolved by the
/// platform adapter when a team is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberRef {
    id: String,
}

impl MemberRef {
    /// Creates a member reference, rejecting empty identifiers.
    pub fn new(id: impl Into<String>) -> Result<Self, RegistryError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RegistryError::EmptyIdentifier("member id"));
        }
        Ok(Self { id })
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_id() {
        let member = MemberRef::new("u1").unwrap();
        assert_eq!(member.id(), "u1");
        assert_eq!(member.to_string(), "u1");
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            MemberRef::new(""),
            Err(RegistryError::EmptyIdentifier("member id"))
        );
    }
}
