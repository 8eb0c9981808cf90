//! Subcommand implementations.

mod farms;
mod list;
mod login;
mod logout;
mod record;
mod status;
mod sync;
mod watch;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Authenticate as an operator
    Login(login::LoginArgs),

    /// Forget the logged-in operator
    Logout,

    /// Show the farm list
    Farms(farms::FarmsArgs),

    /// Record a collection
    Record(record::RecordArgs),

    /// List recorded collections, most recent first
    List(list::ListArgs),

    /// Send pending records to the server
    Sync(sync::SyncArgs),

    /// Show pending records and server reachability
    Status(status::StatusArgs),

    /// Sync automatically whenever the server becomes reachable
    Watch(watch::WatchArgs),
}

pub async fn handle(cmd: Command, config: &Config) -> Result<()> {
    match cmd {
        Command::Login(args) => login::run(args, config).await,
        Command::Logout => logout::run(config),
        Command::Farms(args) => farms::run(args, config).await,
        Command::Record(args) => record::run(args, config).await,
        Command::List(args) => list::run(args, config),
        Command::Sync(args) => sync::run(args, config).await,
        Command::Status(args) => status::run(args, config).await,
        Command::Watch(args) => watch::run(args, config).await,
    }
}
