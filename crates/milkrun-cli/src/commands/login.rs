//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Operator username
    #[arg(long)]
    pub username: String,

    /// Operator password
    #[arg(long, env = "MILKRUN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, config: &Config) -> Result<()> {
    let store = config.open_store()?;
    let remote = config.remote()?;

    eprintln!("{}", "Logging in...".dimmed());

    let operator = remote
        .login(&args.username, &args.password)
        .await
        .context("Failed to login")?;

    store
        .save_user(&operator)
        .context("Failed to save operator")?;

    output::success("Logged in successfully");
    println!();
    output::field("Operator", &operator.username);
    output::field("Id", &operator.id.to_string());
    output::field("Server", remote.server().as_str());

    Ok(())
}
