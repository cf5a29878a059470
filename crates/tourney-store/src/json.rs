//! JSON file storage.
//!
//! The registry is split across two files in one directory:
//!
//! - `teams.json`: `{ "<team>": ["<member id>", ...] }`
//! - `tournaments.json`: `{ "<tournament>": { "participants": [...], "bracket": [[a, b], ...] } }`
//!
//! A bye slot in a bracket is written as `null`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tourney_core::{
    Match, MemberRef, RegistryState, Team, TeamRegistry, Tournament, TournamentRegistry,
};

use crate::{PersistenceStore, StoreError};

const TEAMS_FILE: &str = "teams.json";
const TOURNAMENTS_FILE: &str = "tournaments.json";

/// On-disk shape of one tournament.
#[derive(Debug, Serialize, Deserialize)]
struct TournamentRecord {
    participants: Vec<String>,
    /// Older files may lack brackets entirely.
    #[serde(default)]
    bracket: Vec<Match>,
}

/// Stores the registry as `teams.json` and `tournaments.json`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Creates a store rooted at `dir`. Nothing is touched until the first
    /// save, which creates the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn teams_path(&self) -> PathBuf {
        self.dir.join(TEAMS_FILE)
    }

    #[must_use]
    pub fn tournaments_path(&self) -> PathBuf {
        self.dir.join(TOURNAMENTS_FILE)
    }

    fn load_teams(&self) -> Result<TeamRegistry, StoreError> {
        let Some(content) = read_if_exists(&self.teams_path())? else {
            return Ok(TeamRegistry::new());
        };
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(&content)?;

        raw.into_iter()
            .map(|(name, ids)| -> Result<Team, StoreError> {
                let members = ids
                    .into_iter()
                    .map(MemberRef::new)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| StoreError::Corrupt(format!("team '{}': {}", name, e)))?;
                Ok(Team::with_members(name, members))
            })
            .collect()
    }

    fn load_tournaments(&self) -> Result<TournamentRegistry, StoreError> {
        let Some(content) = read_if_exists(&self.tournaments_path())? else {
            return Ok(TournamentRegistry::new());
        };
        let raw: BTreeMap<String, TournamentRecord> = serde_json::from_str(&content)?;

        Ok(raw
            .into_iter()
            .map(|(name, record)| Tournament {
                name,
                participants: record.participants,
                bracket: record.bracket,
            })
            .collect())
    }
}

impl PersistenceStore for JsonStore {
    fn load(&self) -> Result<RegistryState, StoreError> {
        let teams = self.load_teams()?;
        let tournaments = self.load_tournaments()?;
        tracing::debug!(
            "Loaded {} teams and {} tournaments from {}",
            teams.len(),
            tournaments.len(),
            self.dir.display()
        );
        Ok(RegistryState::from_parts(teams, tournaments))
    }

    /// Stages both files before committing either one. If the second
    /// commit fails the first file is put back, so a failed save never
    /// leaves half of the new state on disk.
    fn save(&self, state: &RegistryState) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        let teams: BTreeMap<&str, Vec<&str>> = state
            .teams
            .iter()
            .map(|team| {
                (
                    team.name.as_str(),
                    team.members.iter().map(MemberRef::id).collect(),
                )
            })
            .collect();
        let tournaments: BTreeMap<&str, TournamentRecord> = state
            .tournaments
            .iter()
            .map(|t| {
                (
                    t.name.as_str(),
                    TournamentRecord {
                        participants: t.participants.clone(),
                        bracket: t.bracket.clone(),
                    },
                )
            })
            .collect();
        let teams_bytes = serde_json::to_vec_pretty(&teams)?;
        let tournaments_bytes = serde_json::to_vec_pretty(&tournaments)?;

        let teams_path = self.teams_path();
        let tournaments_path = self.tournaments_path();
        let previous_teams = read_if_exists(&teams_path)?;

        let teams_tmp = stage(&teams_path, &teams_bytes)?;
        let tournaments_tmp = match stage(&tournaments_path, &tournaments_bytes) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&teams_tmp);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&teams_tmp, &teams_path) {
            let _ = fs::remove_file(&teams_tmp);
            let _ = fs::remove_file(&tournaments_tmp);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&tournaments_tmp, &tournaments_path) {
            let _ = fs::remove_file(&tournaments_tmp);
            if let Err(restore) = restore(&teams_path, previous_teams.as_deref()) {
                tracing::error!(
                    "Failed to restore {} after aborted save: {}",
                    teams_path.display(),
                    restore
                );
            }
            return Err(e.into());
        }

        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.dir.display())
    }
}

/// Reads a file, mapping "not found" to `None`.
fn read_if_exists(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Writes `bytes` to a sibling temp file and returns its path.
fn stage(path: &Path, bytes: &[u8]) -> Result<PathBuf, StoreError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    Ok(tmp)
}

/// Puts back a file's earlier content, or removes it if it did not exist.
fn restore(path: &Path, previous: Option<&str>) -> Result<(), StoreError> {
    match previous {
        Some(content) => {
            let tmp = stage(path, content.as_bytes())?;
            fs::rename(&tmp, path)?;
        }
        None => fs::remove_file(path)?,
    }
    Ok(())
}
