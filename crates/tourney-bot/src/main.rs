//! Tourney Bot
//!
//! Runs registry commands from the command line or from an interactive
//! shell. The shell reads one command per line from stdin and runs each as
//! its own task, the way a chat platform delivers concurrent invocations.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tourney_bot::auto_role::LoggingAssigner;
use tourney_bot::command::Command;
use tourney_bot::config::BotConfig;
use tourney_bot::dispatch::Dispatcher;
use tourney_bot::facade::CommandFacade;

#[derive(Parser)]
#[command(name = "tourney-bot")]
#[command(about = "Team and tournament registry with bracket generation")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value_os_t = BotConfig::config_path())]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands from stdin, one per line
    Shell,
    /// Run a single command, e.g. `run add_team Cup Alpha`
    Run {
        /// Command name followed by its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = BotConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .with_writer(std::io::stderr)
        .init();

    let store = config
        .storage
        .open()
        .context("opening registry storage")?;
    let facade = CommandFacade::open(store).context("loading registry")?;

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(facade),
        Arc::new(LoggingAssigner),
        Arc::new(config.directory()),
        config.command_prefix.clone(),
    ));

    match cli.command {
        Commands::Run { words } => {
            let command = Command::from_tokens(&words)?;
            println!("{}", dispatcher.handle(command).await);
        }
        Commands::Shell => {
            if let Some(job) = config.auto_role.clone() {
                println!("{}", dispatcher.handle(Command::AutoRole(job)).await);
            }
            run_shell(dispatcher.clone()).await?;
        }
    }

    dispatcher.shutdown().await;
    Ok(())
}

/// Dispatches stdin lines concurrently and prints replies in input order.
async fn run_shell(dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    tracing::info!("Shell ready, reading commands from stdin");

    let (tx, mut rx) = mpsc::unbounded_channel::<JoinHandle<Option<String>>>();
    let printer = tokio::spawn(async move {
        while let Some(handle) = rx.recv().await {
            match handle.await {
                Ok(Some(reply)) => println!("{}", reply),
                Ok(None) => {}
                Err(e) => tracing::error!("Command task failed: {}", e),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let dispatcher = dispatcher.clone();
        let handle = tokio::spawn(async move { dispatcher.handle_line(&line).await });
        if tx.send(handle).is_err() {
            break;
        }
    }

    drop(tx);
    printer.await?;
    tracing::info!("Input closed, shutting down");
    Ok(())
}
