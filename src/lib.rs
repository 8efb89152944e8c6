//! slircbot - Straylight IRC Bot
//!
//! A plugin-driven IRC client runtime. One connection, one sequential
//! dispatch loop: each line from the server is parsed into an event, handed
//! to every plugin in load order, and the commands the plugins issue are
//! flushed in a fixed order before the next line is read.
//!
//! ```no_run
//! use std::sync::Arc;
//! use slircbot::config::ConfigStore;
//! use slircbot::network::{Dispatcher, run_session};
//! use slircbot::plugin::Services;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(ConfigStore::load("slircbot.toml")?);
//! let mut dispatcher = Dispatcher::new(Services::new(Arc::clone(&store)));
//! for plugin in slircbot::plugins::builtin(&store.get()) {
//!     dispatcher.load(plugin);
//! }
//! let outcome = run_session(dispatcher).await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod ignore;
pub mod network;
pub mod plugin;
pub mod plugins;
pub mod roster;
pub mod sender;
pub mod telemetry;

pub use slirc_wire as wire;
