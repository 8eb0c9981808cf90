//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Command;

/// Record milk collections offline and sync them with the server.
#[derive(Parser, Debug)]
#[command(name = "milkrun")]
#[command(author, version = env!("MILKRUN_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Local store directory (defaults to the platform data directory)
    #[arg(long, env = "MILKRUN_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Collection server API base URL
    #[arg(
        long,
        env = "MILKRUN_SERVER",
        default_value = "http://localhost:3001/api",
        global = true
    )]
    pub server: String,

    /// Request timeout in seconds
    #[arg(long, env = "MILKRUN_TIMEOUT", default_value_t = 15, global = true)]
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_balance_parses() {
        let cli = Cli::try_parse_from([
            "milkrun", "record", "--farm", "3", "--quantity", "12.5", "--balance", "-4",
        ])
        .unwrap();

        match cli.command {
            Command::Record(args) => {
                assert_eq!(args.farm.get(), 3);
                assert_eq!(args.balance, -4.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "milkrun",
            "status",
            "--data-dir",
            "/tmp/milkrun",
            "--timeout",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.global.data_dir, Some(PathBuf::from("/tmp/milkrun")));
        assert_eq!(cli.global.timeout, 3);
    }
}
