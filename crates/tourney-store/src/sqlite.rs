//! SQLite storage for the registry.
//!
//! Each list is stored one row per element with an explicit `position`
//! column, so order (and duplicates) survive a round trip. Bracket matches
//! get their own table; a bye is a NULL slot.

use rusqlite::Connection;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use tourney_core::{
    Match, MemberRef, RegistryState, Slot, Team, TeamRegistry, Tournament, TournamentRegistry,
};

use crate::{PersistenceStore, StoreError};

/// SQLite-backed registry storage.
///
/// # Example
///
/// ```ignore
/// let store = SqliteStore::open("data/tourney.db")?;
/// let state = store.load()?;
/// store.save(&state)?;
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteStore {
    /// Opens or creates a database at the given path.
    ///
    /// The schema is created on first open. Use `":memory:"` for a
    /// throwaway database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or if schema
    /// initialization fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let location = path.as_ref().display().to_string();
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            location,
        })
    }
}

/// Creates tables if they do not exist.
fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS teams (
            name TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS team_members (
            team TEXT NOT NULL REFERENCES teams(name) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            member_id TEXT NOT NULL,
            PRIMARY KEY (team, position)
        );

        CREATE TABLE IF NOT EXISTS tournaments (
            name TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS participants (
            tournament TEXT NOT NULL REFERENCES tournaments(name) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            team TEXT NOT NULL,
            PRIMARY KEY (tournament, position)
        );

        CREATE TABLE IF NOT EXISTS bracket_matches (
            tournament TEXT NOT NULL REFERENCES tournaments(name) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            slot_a TEXT,
            slot_b TEXT,
            PRIMARY KEY (tournament, position)
        );
        ",
    )
}

fn load_teams(conn: &Connection) -> Result<TeamRegistry, StoreError> {
    let mut rosters: BTreeMap<String, Vec<MemberRef>> = BTreeMap::new();

    let mut stmt = conn.prepare("SELECT name FROM teams")?;
    for name in stmt.query_map([], |row| row.get::<_, String>(0))? {
        rosters.insert(name?, Vec::new());
    }

    let mut stmt =
        conn.prepare("SELECT team, member_id FROM team_members ORDER BY team, position")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (team, id) = row?;
        let member = MemberRef::new(id)
            .map_err(|e| StoreError::Corrupt(format!("team '{}': {}", team, e)))?;
        rosters
            .get_mut(&team)
            .ok_or_else(|| StoreError::Corrupt(format!("member row for unknown team '{}'", team)))?
            .push(member);
    }

    Ok(rosters
        .into_iter()
        .map(|(name, members)| Team::with_members(name, members))
        .collect())
}

fn load_tournaments(conn: &Connection) -> Result<TournamentRegistry, StoreError> {
    let mut tournaments: BTreeMap<String, Tournament> = BTreeMap::new();

    let mut stmt = conn.prepare("SELECT name FROM tournaments")?;
    for name in stmt.query_map([], |row| row.get::<_, String>(0))? {
        let name = name?;
        tournaments.insert(name.clone(), Tournament::new(name));
    }

    let mut stmt =
        conn.prepare("SELECT tournament, team FROM participants ORDER BY tournament, position")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (tournament, team) = row?;
        lookup(&mut tournaments, &tournament)?.participants.push(team);
    }

    let mut stmt = conn.prepare(
        "SELECT tournament, slot_a, slot_b FROM bracket_matches ORDER BY tournament, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;
    for row in rows {
        let (tournament, a, b) = row?;
        lookup(&mut tournaments, &tournament)?
            .bracket
            .push(Match::new(Slot::from(a), Slot::from(b)));
    }

    Ok(tournaments.into_values().collect())
}

fn lookup<'a>(
    tournaments: &'a mut BTreeMap<String, Tournament>,
    name: &str,
) -> Result<&'a mut Tournament, StoreError> {
    tournaments
        .get_mut(name)
        .ok_or_else(|| StoreError::Corrupt(format!("row for unknown tournament '{}'", name)))
}

impl PersistenceStore for SqliteStore {
    fn load(&self) -> Result<RegistryState, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let teams = load_teams(&conn)?;
        let tournaments = load_tournaments(&conn)?;
        Ok(RegistryState::from_parts(teams, tournaments))
    }

    /// Replaces every row in a single transaction.
    fn save(&self, state: &RegistryState) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = conn.transaction()?;

        tx.execute_batch(
            "
            DELETE FROM bracket_matches;
            DELETE FROM participants;
            DELETE FROM tournaments;
            DELETE FROM team_members;
            DELETE FROM teams;
            ",
        )?;

        {
            let mut insert_team = tx.prepare("INSERT INTO teams (name) VALUES (?1)")?;
            let mut insert_member = tx.prepare(
                "INSERT INTO team_members (team, position, member_id) VALUES (?1, ?2, ?3)",
            )?;
            for team in state.teams.iter() {
                insert_team.execute([&team.name])?;
                for (position, member) in team.members.iter().enumerate() {
                    insert_member.execute((&team.name, position as i64, member.id()))?;
                }
            }

            let mut insert_tournament = tx.prepare("INSERT INTO tournaments (name) VALUES (?1)")?;
            let mut insert_participant = tx.prepare(
                "INSERT INTO participants (tournament, position, team) VALUES (?1, ?2, ?3)",
            )?;
            let mut insert_match = tx.prepare(
                "INSERT INTO bracket_matches (tournament, position, slot_a, slot_b)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for tournament in state.tournaments.iter() {
                insert_tournament.execute([&tournament.name])?;
                for (position, team) in tournament.participants.iter().enumerate() {
                    insert_participant.execute((&tournament.name, position as i64, team))?;
                }
                for (position, m) in tournament.bracket.iter().enumerate() {
                    insert_match.execute((
                        &tournament.name,
                        position as i64,
                        m.slot_a().team(),
                        m.slot_b().team(),
                    ))?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper function to create an in-memory database for testing.
    fn create_test_store() -> SqliteStore {
        SqliteStore::open(":memory:").expect("Failed to create in-memory store")
    }

    fn table_count(store: &SqliteStore, table: &str) -> i64 {
        let conn = store.conn.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_open_creates_tables() {
        let store = create_test_store();
        let conn = store.conn.lock().unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for table in [
            "teams",
            "team_members",
            "tournaments",
            "participants",
            "bracket_matches",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {}", table);
        }
    }

    #[test]
    fn test_empty_database_loads_empty_state() {
        let store = create_test_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_with_bracket_and_bye() {
        let store = create_test_store();

        let mut state = RegistryState::new();
        for name in ["Alpha", "Beta", "Gamma"] {
            state.create_team(name).unwrap();
        }
        state
            .add_member("Beta", MemberRef::new("u2").unwrap())
            .unwrap();
        state
            .add_member("Beta", MemberRef::new("u1").unwrap())
            .unwrap();
        state.tournaments = std::iter::once(Tournament {
            name: "Cup".into(),
            participants: vec![
                "Gamma".into(),
                "Alpha".into(),
                "Beta".into(),
                "Gone".into(),
                "Gamma".into(),
            ],
            bracket: vec![
                Match::new(Slot::Team("Gone".into()), Slot::Team("Alpha".into())),
                Match::new(Slot::Team("Gamma".into()), Slot::Bye),
            ],
        })
        .collect();

        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
        assert_eq!(table_count(&store, "bracket_matches"), 2);
    }

    #[test]
    fn test_save_replaces_all_rows() {
        let store = create_test_store();

        let mut first = RegistryState::new();
        first.create_team("Alpha").unwrap();
        first
            .add_member("Alpha", MemberRef::new("u1").unwrap())
            .unwrap();
        first.create_tournament("Cup").unwrap();
        store.save(&first).unwrap();

        let mut second = RegistryState::new();
        second.create_team("Beta").unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), second);
        assert_eq!(table_count(&store, "team_members"), 0);
        assert_eq!(table_count(&store, "tournaments"), 0);
    }

    #[test]
    fn test_orphan_member_row_is_corrupt() {
        let store = create_test_store();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute_batch(
                "PRAGMA foreign_keys = OFF;
                 INSERT INTO team_members (team, position, member_id) VALUES ('Ghost', 0, 'u1');",
            )
            .unwrap();
        }

        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tourney.db");

        let mut state = RegistryState::new();
        state.create_team("Alpha").unwrap();
        SqliteStore::open(&path).unwrap().save(&state).unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.load().unwrap(), state);
        assert!(reopened.describe().starts_with("sqlite:"));
    }
}
