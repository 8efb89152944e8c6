//! slircbot - Straylight IRC Bot
//!
//! Supervisor: loads the configuration, runs one session, and decides from
//! its outcome whether to connect again.

use slircbot::config::{ConfigStore, default_config_path, validate};
use slircbot::network::{Dispatcher, Outcome, run_session};
use slircbot::plugin::Services;
use slircbot::plugins;
use slircbot::telemetry::{self, Telemetry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Pause before reconnecting on request.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Pause before retrying a lost connection.
const KEEPALIVE_DELAY: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(default_config_path);

    let mut logging: Option<Telemetry> = None;

    loop {
        // Re-read every iteration so edits apply on reconnect
        let store = Arc::new(ConfigStore::load(&config_path).map_err(|e| {
            eprintln!("failed to load {config_path}: {e}");
            e
        })?);
        let config = store.get();
        match logging.as_mut() {
            Some(logging) => logging.apply(&config)?,
            None => logging = Some(telemetry::init(&config)?),
        }

        if let Err(errors) = validate(&config) {
            for e in &errors {
                error!(path = %config_path, error = %e, "invalid configuration");
            }
            return Err(anyhow::anyhow!(
                "{} configuration error(s) in {config_path}",
                errors.len()
            ));
        }

        info!(
            server = %config.server,
            port = config.port,
            nick = %config.nick,
            "Starting slircbot"
        );

        let mut dispatcher = Dispatcher::new(Services::new(Arc::clone(&store)));
        for plugin in plugins::builtin(&config) {
            dispatcher.load(plugin);
        }
        if dispatcher.is_empty() {
            warn!("no plugins loaded");
        }

        match run_session(dispatcher).await {
            Outcome::Reconnect => {
                info!("reconnecting");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
            Outcome::Keepalive => {
                info!(delay = ?KEEPALIVE_DELAY, "connection lost, retrying");
                tokio::time::sleep(KEEPALIVE_DELAY).await;
            }
            Outcome::End => break,
        }
    }

    info!("Shutdown complete");
    Ok(())
}
