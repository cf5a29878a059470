//! Serialized, write-through access to the registry.
//!
//! Every operation takes one lock over the whole registry for its full
//! read-decide-mutate-persist sequence. Mutations are applied to a working
//! copy and only become visible once the store has accepted that copy, so a
//! failed save leaves memory and disk in agreement.

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use tourney_core::{ErrorKind, Match, MemberRef, RegistryError, RegistryState, Team, Tournament};
use tourney_store::{PersistenceStore, StoreError};

use crate::command::RegistryCommand;
use crate::member::parse_member;

/// Errors returned by facade operations.
#[derive(Debug, Error)]
pub enum FacadeError {
    /// The operation was rejected; nothing changed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The change could not be saved and was not applied.
    #[error("change not saved: {0}")]
    Persistence(#[from] StoreError),
}

impl FacadeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Registry(e) => e.kind(),
            Self::Persistence(_) => ErrorKind::IoFailure,
        }
    }
}

/// Result of one executed [`RegistryCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    TeamCreated(Team),
    MemberAdded(Team),
    Team(Option<Team>),
    TournamentCreated(Tournament),
    TeamAdded(Tournament),
    Tournament {
        tournament: Option<Tournament>,
        /// Participants whose team no longer exists.
        missing: Vec<String>,
    },
    Bracket {
        tournament: String,
        matches: Vec<Match>,
    },
    TeamNames(Vec<String>),
    TournamentNames(Vec<String>),
}

struct Guarded {
    state: RegistryState,
    rng: StdRng,
}

/// The operation surface exposed to command dispatch.
pub struct CommandFacade {
    inner: Mutex<Guarded>,
    store: Box<dyn PersistenceStore>,
}

impl CommandFacade {
    /// Loads the registry from `store` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the existing data cannot be read.
    pub fn open(store: Box<dyn PersistenceStore>) -> Result<Self, StoreError> {
        Self::open_with_rng(store, StdRng::from_entropy())
    }

    /// Like [`Self::open`] but with a caller-supplied random source.
    pub fn open_with_rng(
        store: Box<dyn PersistenceStore>,
        rng: StdRng,
    ) -> Result<Self, StoreError> {
        let state = store.load()?;
        tracing::info!(
            "Registry loaded from {}: {} teams, {} tournaments",
            store.describe(),
            state.teams.len(),
            state.tournaments.len()
        );
        Ok(Self {
            inner: Mutex::new(Guarded { state, rng }),
            store,
        })
    }

    pub async fn create_team(&self, name: &str) -> Result<Team, FacadeError> {
        self.mutate("create_team", |state, _| state.create_team(name).cloned())
            .await
    }

    pub async fn add_member(&self, team: &str, member: MemberRef) -> Result<Team, FacadeError> {
        self.mutate("add_member", |state, _| {
            state.add_member(team, member).cloned()
        })
        .await
    }

    pub async fn get_team(&self, name: &str) -> Option<Team> {
        self.read(|state| state.teams.get(name).cloned()).await
    }

    pub async fn create_tournament(&self, name: &str) -> Result<Tournament, FacadeError> {
        self.mutate("create_tournament", |state, _| {
            state.create_tournament(name).cloned()
        })
        .await
    }

    pub async fn add_team_to_tournament(
        &self,
        tournament: &str,
        team: &str,
    ) -> Result<Tournament, FacadeError> {
        self.mutate("add_team_to_tournament", |state, _| {
            state.add_team_to_tournament(tournament, team).cloned()
        })
        .await
    }

    pub async fn get_tournament(&self, name: &str) -> Option<Tournament> {
        self.read(|state| state.tournaments.get(name).cloned())
            .await
    }

    /// Generates and stores a new bracket, replacing the previous one.
    pub async fn generate_bracket(&self, tournament: &str) -> Result<Vec<Match>, FacadeError> {
        self.mutate("generate_bracket", |state, rng| {
            state
                .generate_bracket(tournament, rng)
                .map(<[Match]>::to_vec)
        })
        .await
    }

    pub async fn list_teams(&self) -> Vec<String> {
        self.read(|state| state.teams.names().map(str::to_string).collect())
            .await
    }

    pub async fn list_tournaments(&self) -> Vec<String> {
        self.read(|state| state.tournaments.names().map(str::to_string).collect())
            .await
    }

    /// Returns a copy of the whole registry.
    pub async fn snapshot(&self) -> RegistryState {
        self.read(RegistryState::clone).await
    }

    /// Runs one parsed command.
    pub async fn execute(&self, command: RegistryCommand) -> Result<Outcome, FacadeError> {
        let outcome = match command {
            RegistryCommand::CreateTeam { name } => {
                Outcome::TeamCreated(self.create_team(&name).await?)
            }
            RegistryCommand::AddMember { team, member } => {
                let member = parse_member(&member)?;
                Outcome::MemberAdded(self.add_member(&team, member).await?)
            }
            RegistryCommand::GetTeam { name } => Outcome::Team(self.get_team(&name).await),
            RegistryCommand::CreateTournament { name } => {
                Outcome::TournamentCreated(self.create_tournament(&name).await?)
            }
            RegistryCommand::AddTeamToTournament { tournament, team } => {
                Outcome::TeamAdded(self.add_team_to_tournament(&tournament, &team).await?)
            }
            RegistryCommand::GetTournament { name } => {
                let (tournament, missing) = self
                    .read(|state| match state.tournaments.get(&name) {
                        Some(t) => (
                            Some(t.clone()),
                            t.missing_participants(&state.teams)
                                .into_iter()
                                .map(str::to_string)
                                .collect::<Vec<_>>(),
                        ),
                        None => (None, Vec::new()),
                    })
                    .await;
                Outcome::Tournament {
                    tournament,
                    missing,
                }
            }
            RegistryCommand::GenerateBracket { tournament } => {
                let matches = self.generate_bracket(&tournament).await?;
                Outcome::Bracket {
                    tournament,
                    matches,
                }
            }
            RegistryCommand::ListTeams => Outcome::TeamNames(self.list_teams().await),
            RegistryCommand::ListTournaments => {
                Outcome::TournamentNames(self.list_tournaments().await)
            }
        };
        Ok(outcome)
    }

    /// Runs `f` against a working copy, saves it, then commits it.
    async fn mutate<T, F>(&self, op: &'static str, f: F) -> Result<T, FacadeError>
    where
        F: FnOnce(&mut RegistryState, &mut StdRng) -> Result<T, RegistryError>,
    {
        let mut guard = self.inner.lock().await;
        let span = tracing::info_span!("command", op, command_id = %Uuid::new_v4());
        let _entered = span.enter();

        let Guarded { state, rng } = &mut *guard;
        let mut working = state.clone();

        let value = match f(&mut working, rng) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Rejected: {}", e);
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.save(&working) {
            tracing::error!("Save to {} failed, change dropped: {}", self.store.describe(), e);
            return Err(e.into());
        }

        *state = working;
        tracing::info!("Applied and saved");
        Ok(value)
    }

    async fn read<T>(&self, f: impl FnOnce(&RegistryState) -> T) -> T {
        let guard = self.inner.lock().await;
        f(&guard.state)
    }
}
