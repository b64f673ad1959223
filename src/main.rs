#![deny(clippy::mod_module_files)]
use std::env;
use std::io;

use anyhow::Result;
use clap::Parser;

mod commands;
mod config;
mod error;
mod ledger;
mod pack;
mod protocol;
mod report;
mod repository;
mod transport;

use config::JoystreamRemoteConfig;
use ledger::NodeClient;
use pack::GitPackSource;
use repository::RepositoryCoordinate;
use transport::LedgerSession;

/// Git remote helper for the Joystream ledger.
///
/// Git passes a remote name and, when the remote is configured with a URL,
/// the URL as a second argument. With a single argument the repository
/// argument is itself the URL.
#[derive(Parser)]
#[command(name = "git-remote-joystream")]
struct Args {
    /// Remote name, or the repository URL when invoked with one argument
    repository: String,
    /// Repository URL (joystream://<chain>/<owner>/<name>)
    url: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let raw: Vec<String> = env::args().collect();

    // Standalone listing command: git-remote-joystream list-refs <uri>
    if raw.len() >= 2 && raw[1] == "list-refs" {
        if raw.len() != 3 {
            anyhow::bail!("Usage: git-remote-joystream list-refs <chain>/<owner>/<name>");
        }
        let config = JoystreamRemoteConfig::load()?;
        let client = NodeClient::new(&config)?;
        return commands::list_refs::handle(&client, &raw[2], &mut io::stdout());
    }

    let args = Args::parse();
    let url = args.url.as_ref().unwrap_or(&args.repository);

    // Fatal before any ledger call: a malformed URL means there is no
    // repository to talk about.
    let repo = RepositoryCoordinate::parse(url)?;

    eprintln!("git-remote-joystream: starting, repo: {}", repo);

    let config = JoystreamRemoteConfig::load()?;
    let client = NodeClient::new(&config)?;
    let mut session = LedgerSession::new(client, repo);
    let mut pack_source = GitPackSource;

    let stdin = io::stdin();
    let stdout = io::stdout();
    protocol::run(&mut session, &mut pack_source, stdin.lock(), stdout.lock())?;

    Ok(())
}
