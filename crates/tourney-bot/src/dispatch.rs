//! Routes text commands to the facade and the auto-role scheduler.
//!
//! This is the stand-in for a chat-platform adapter: it takes raw lines,
//! runs them, and turns the outcome into a plain-text reply.

use std::fmt::Write;
use std::sync::Arc;
use tokio::sync::Mutex;

use tourney_core::{Team, Tournament};

use crate::auto_role::{AutoRoleScheduler, RoleAssigner};
use crate::command::Command;
use crate::facade::{CommandFacade, Outcome};
use crate::member::MemberDirectory;

/// Parses, executes, and renders commands.
pub struct Dispatcher {
    facade: Arc<CommandFacade>,
    scheduler: Mutex<AutoRoleScheduler>,
    assigner: Arc<dyn RoleAssigner>,
    directory: Arc<dyn MemberDirectory>,
    prefix: String,
}

impl Dispatcher {
    pub fn new(
        facade: Arc<CommandFacade>,
        assigner: Arc<dyn RoleAssigner>,
        directory: Arc<dyn MemberDirectory>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            facade,
            scheduler: Mutex::new(AutoRoleScheduler::new()),
            assigner,
            directory,
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn facade(&self) -> &CommandFacade {
        &self.facade
    }

    /// Handles one input line.
    ///
    /// Blank lines and lines without the command prefix are ignored and
    /// yield `None`, like ordinary chat messages.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() || !line.starts_with(&self.prefix) {
            return None;
        }
        Some(match Command::parse(&self.prefix, line) {
            Ok(command) => self.handle(command).await,
            Err(e) => format!("error: {}", e),
        })
    }

    /// Executes a parsed command and renders the reply.
    pub async fn handle(&self, command: Command) -> String {
        match command {
            Command::Registry(command) => match self.facade.execute(command).await {
                Ok(outcome) => self.render(&outcome),
                Err(e) => format!("error: {}", e),
            },
            Command::AutoRole(job) => {
                let summary = format!(
                    "Auto-role '{}' for '{}' every {}s",
                    job.target_role, job.criterion, job.interval_seconds
                );
                let mut scheduler = self.scheduler.lock().await;
                match scheduler.configure(job, self.assigner.clone()).await {
                    Ok(()) => summary,
                    Err(e) => format!("error: {}", e),
                }
            }
            Command::StopAutoRole => match self.scheduler.lock().await.stop().await {
                Some(job) => format!("Auto-role '{}' stopped", job.target_role),
                None => "No auto-role job is running".to_string(),
            },
        }
    }

    /// Stops background work. Call once before exiting.
    pub async fn shutdown(&self) {
        self.scheduler.lock().await.stop().await;
    }

    /// Returns true while an auto-role job is scheduled.
    pub async fn auto_role_running(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    fn render(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::TeamCreated(team) => format!("Team '{}' created", team.name),
            Outcome::MemberAdded(team) => {
                format!("Added to '{}': {}", team.name, self.roster(team))
            }
            Outcome::Team(Some(team)) => format!("{}: {}", team.name, self.roster(team)),
            Outcome::Team(None) => "No such team".to_string(),
            Outcome::TournamentCreated(t) => format!("Tournament '{}' created", t.name),
            Outcome::TeamAdded(t) => format!(
                "'{}' now has {} participants",
                t.name,
                t.participants.len()
            ),
            Outcome::Tournament {
                tournament: Some(t),
                missing,
            } => render_tournament(t, missing),
            Outcome::Tournament {
                tournament: None, ..
            } => "No such tournament".to_string(),
            Outcome::Bracket {
                tournament,
                matches,
            } => {
                let mut out = format!("Bracket for '{}':", tournament);
                for (i, m) in matches.iter().enumerate() {
                    let _ = write!(out, "\n  {}. {}", i + 1, m);
                }
                out
            }
            Outcome::TeamNames(names) | Outcome::TournamentNames(names) if names.is_empty() => {
                "(none)".to_string()
            }
            Outcome::TeamNames(names) | Outcome::TournamentNames(names) => names.join(", "),
        }
    }

    fn roster(&self, team: &Team) -> String {
        if team.members.is_empty() {
            return "(no members)".to_string();
        }
        team.members
            .iter()
            .map(|member| self.directory.label(member))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn render_tournament(t: &Tournament, missing: &[String]) -> String {
    let mut out = format!("{}: {}", t.name, t.participants.join(", "));
    if t.participants.is_empty() {
        out.push_str("(no participants)");
    }
    if !missing.is_empty() {
        let _ = write!(out, "\n  missing teams: {}", missing.join(", "));
    }
    for (i, m) in t.bracket.iter().enumerate() {
        let _ = write!(out, "\n  {}. {}", i + 1, m);
    }
    out
}
