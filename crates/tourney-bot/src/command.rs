//! Text command parsing.
//!
//! Commands arrive as single lines such as `!add_team Cup "Red Team"`. The
//! first word selects the command, the rest are arguments. Double quotes
//! group words into one argument.

use thiserror::Error;

use crate::auto_role::AutoRoleJob;

/// Errors produced while parsing a command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("commands must start with '{0}'")]
    MissingPrefix(String),

    #[error("no command given")]
    Empty,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing argument <{argument}> for {command}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("too many arguments for {command}: expected {expected}")]
    TooManyArguments {
        command: &'static str,
        expected: usize,
    },

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("unterminated quote")]
    UnterminatedQuote,
}

/// An operation against the team and tournament registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCommand {
    CreateTeam { name: String },
    AddMember { team: String, member: String },
    GetTeam { name: String },
    CreateTournament { name: String },
    AddTeamToTournament { tournament: String, team: String },
    GetTournament { name: String },
    GenerateBracket { tournament: String },
    ListTeams,
    ListTournaments,
}

/// Any command the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Registry(RegistryCommand),
    /// Configure (or reconfigure) the recurring role assignment.
    AutoRole(AutoRoleJob),
    StopAutoRole,
}

impl Command {
    /// Parses a prefixed command line.
    pub fn parse(prefix: &str, line: &str) -> Result<Self, CommandParseError> {
        let body = line
            .trim()
            .strip_prefix(prefix)
            .ok_or_else(|| CommandParseError::MissingPrefix(prefix.to_string()))?;
        Self::from_tokens(&tokenize(body)?)
    }

    /// Builds a command from already split words, e.g. CLI arguments.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, CommandParseError> {
        let (name, args) = tokens.split_first().ok_or(CommandParseError::Empty)?;
        let args: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();

        let command = match name.as_ref() {
            "create_team" => {
                let [name] = take("create_team", &args, ["name"])?;
                Self::Registry(RegistryCommand::CreateTeam { name })
            }
            "add_member" => {
                let [team, member] = take("add_member", &args, ["team", "member"])?;
                Self::Registry(RegistryCommand::AddMember { team, member })
            }
            "team" => {
                let [name] = take("team", &args, ["name"])?;
                Self::Registry(RegistryCommand::GetTeam { name })
            }
            "create_tournament" => {
                let [name] = take("create_tournament", &args, ["name"])?;
                Self::Registry(RegistryCommand::CreateTournament { name })
            }
            "add_team" => {
                let [tournament, team] = take("add_team", &args, ["tournament", "team"])?;
                Self::Registry(RegistryCommand::AddTeamToTournament { tournament, team })
            }
            "tournament" => {
                let [name] = take("tournament", &args, ["name"])?;
                Self::Registry(RegistryCommand::GetTournament { name })
            }
            "generate_bracket" => {
                let [tournament] = take("generate_bracket", &args, ["tournament"])?;
                Self::Registry(RegistryCommand::GenerateBracket { tournament })
            }
            "teams" => {
                take("teams", &args, [])?;
                Self::Registry(RegistryCommand::ListTeams)
            }
            "tournaments" => {
                take("tournaments", &args, [])?;
                Self::Registry(RegistryCommand::ListTournaments)
            }
            "auto_role" => {
                let [interval, criterion, target_role] =
                    take("auto_role", &args, ["interval_seconds", "criterion", "role"])?;
                let interval_seconds = interval
                    .parse()
                    .map_err(|_| CommandParseError::InvalidNumber(interval))?;
                Self::AutoRole(AutoRoleJob {
                    interval_seconds,
                    criterion,
                    target_role,
                })
            }
            "stop_auto_role" => {
                take("stop_auto_role", &args, [])?;
                Self::StopAutoRole
            }
            other => return Err(CommandParseError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

/// Takes exactly `N` arguments, naming the first missing one on error.
fn take<const N: usize>(
    command: &'static str,
    values: &[&str],
    names: [&'static str; N],
) -> Result<[String; N], CommandParseError> {
    if values.len() > N {
        return Err(CommandParseError::TooManyArguments {
            command,
            expected: N,
        });
    }
    if let Some(&argument) = names.get(values.len()) {
        return Err(CommandParseError::MissingArgument { command, argument });
    }
    Ok(std::array::from_fn(|i| values[i].to_string()))
}

/// Splits on whitespace, keeping double-quoted runs together.
fn tokenize(input: &str) -> Result<Vec<String>, CommandParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(CommandParseError::UnterminatedQuote);
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}
