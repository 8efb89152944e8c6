//! Shared helpers for integration tests.
//!
//! Runs a real [`Session`] over an in-memory pipe. The test plays the IRC
//! server: it reads what the bot writes and feeds it lines.

#![allow(dead_code)]

pub mod probe;
pub mod server;

pub use probe::{Journal, Probe};
pub use server::TestServer;

use std::sync::Arc;
use std::time::Duration;

use slircbot::config::ConfigStore;
use slircbot::network::{Dispatcher, Outcome, SessionOptions};
use slircbot::plugin::{Plugin, Services};

/// Baseline configuration for a bot called `bot`.
pub const BASE_CONFIG: &str = r#"
server = "irc.test"
nick = "bot"
username = "slirc"
realname = "Straylight Bot"
plugins = "none"
"#;

/// Build services from [`BASE_CONFIG`] plus extra TOML.
pub fn services(extra: &str) -> Services {
    let toml = format!("{BASE_CONFIG}\n{extra}");
    let store = ConfigStore::from_toml(&toml).expect("test config should parse");
    Services::new(Arc::new(store))
}

/// Session options with a fast tick and the given idle timeout.
pub fn options(idle_timeout: Option<Duration>, base_outcome: Outcome) -> SessionOptions {
    SessionOptions {
        idle_timeout,
        tick_interval: Duration::from_millis(5),
        base_outcome,
    }
}

/// Start a session with `plugins` loaded in order.
pub fn start(
    services: Services,
    plugins: Vec<Box<dyn Plugin>>,
    options: SessionOptions,
) -> TestServer {
    let mut dispatcher = Dispatcher::new(services);
    for plugin in plugins {
        dispatcher.load(plugin);
    }
    TestServer::spawn(dispatcher, options)
}
