//! Resolved runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use milkrun_core::ServerUrl;
use milkrun_file::FileStore;
use milkrun_http::{ClientConfig, HttpRemote};
use milkrun_sync::Synchronizer;

use crate::cli::GlobalArgs;

/// The synchronizer every command uses.
pub type AppSynchronizer = Synchronizer<FileStore, HttpRemote>;

/// Configuration after defaults and validation.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub server: ServerUrl,
    pub timeout: Duration,
}

impl Config {
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let data_dir = match &args.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };

        let server = ServerUrl::new(&args.server).context("Invalid server URL")?;

        if args.timeout == 0 {
            anyhow::bail!("Timeout must be at least one second");
        }

        Ok(Self {
            data_dir,
            server,
            timeout: Duration::from_secs(args.timeout),
        })
    }

    /// Open the local store.
    pub fn open_store(&self) -> Result<FileStore> {
        FileStore::open(&self.data_dir).with_context(|| {
            format!(
                "Failed to open local store at {}",
                self.data_dir.display()
            )
        })
    }

    /// A client for the configured server.
    pub fn remote(&self) -> Result<HttpRemote> {
        let config = ClientConfig::new(self.server.clone()).with_timeout(self.timeout);
        HttpRemote::new(config).context("Failed to create HTTP client")
    }

    /// A synchronizer over the local store and the configured server.
    pub fn synchronizer(&self) -> Result<AppSynchronizer> {
        let store = self.open_store()?;
        let remote = self.remote()?;
        Ok(Synchronizer::new(store.into(), remote).with_submit_timeout(self.timeout))
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "milkrun").context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
