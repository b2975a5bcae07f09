mod diff;
mod sync;

pub use diff::handle_diff;
pub use sync::handle_sync;

use anyhow::Context;
use flowsync_defs::NormalizeDefaults;
use flowsync_utils::SyncConfig;
use http_client::OrchestratorClient;
use log::debug;

/// Reads the configuration from the environment and builds the API client.
/// Nothing is sent to the server yet.
fn connect() -> anyhow::Result<(OrchestratorClient, NormalizeDefaults)> {
    let config = SyncConfig::from_env().context("Invalid configuration")?;
    debug!(
        "Using API at {} ({:?}, timeout {:?})",
        config.server.api_url, config.server.credentials, config.server.timeout
    );
    let client = OrchestratorClient::new(&config.server).context("Failed to set up API client")?;
    Ok((client, config.defaults))
}
