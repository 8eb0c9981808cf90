//! Logout command implementation.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::output;

pub fn run(config: &Config) -> Result<()> {
    let store = config.open_store()?;

    let Some(operator) = store.user().context("Failed to read operator")? else {
        output::warning("Not logged in");
        return Ok(());
    };

    store.clear_user().context("Failed to clear operator")?;
    output::success(&format!("Logged out {}", operator.username));

    let pending = store.pending().context("Failed to read records")?.len();
    if pending > 0 {
        output::warning(&format!(
            "{} record(s) still pending; run 'milkrun sync' to send them",
            pending
        ));
    }

    Ok(())
}
