//! Member lookup capability.
//!
//! The registry stores bare member ids. Turning an id into something a
//! person recognizes is the platform adapter's job; this module defines the
//! seam and a table-backed implementation used by the shell.

use std::collections::HashMap;

use tourney_core::{MemberRef, RegistryError};

/// Resolves member ids to display names.
pub trait MemberDirectory: Send + Sync {
    /// Returns the display name for a member, if known.
    fn display_name(&self, member: &MemberRef) -> Option<String>;

    /// Display name, falling back to the raw id.
    fn label(&self, member: &MemberRef) -> String {
        self.display_name(member)
            .unwrap_or_else(|| member.id().to_string())
    }
}

/// Directory backed by a fixed `id -> name` table.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    names: HashMap<String, String>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }
}

impl MemberDirectory for StaticDirectory {
    fn display_name(&self, member: &MemberRef) -> Option<String> {
        self.names.get(member.id()).cloned()
    }
}

/// Parses a member argument.
///
/// Accepts a bare id or a mention of the form `<@id>` / `<@!id>`.
pub fn parse_member(arg: &str) -> Result<MemberRef, RegistryError> {
    let id = arg
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|inner| inner.trim_start_matches('!'))
        .unwrap_or(arg);
    MemberRef::new(id)
}
