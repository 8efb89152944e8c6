//! Plugin interface.
//!
//! A plugin is a value implementing [`Plugin`]. The dispatch loop calls its
//! hooks in registration order, one line at a time. Every hook receives a
//! [`Context`] that carries the event being dispatched (if any), issues
//! commands through the shared sender, and exposes the shared services.
//!
//! ## Hooks
//!
//! - [`Plugin::on_connect`] once after registration commands are sent
//! - [`Plugin::on_raw`] and [`Plugin::on_tick`] for every line
//! - [`Plugin::on_tick`] also while the connection is idle
//! - [`Plugin::on_response`] for numeric replies
//! - one `on_<type>` hook per request type, skipped for ignored senders
//! - [`Plugin::on_shutdown`] once when the session ends
//!
//! All hooks default to doing nothing.

mod command;
mod cron;
mod registry;

pub use command::{Arity, CommandHandler, CommandSet, Invocation, from_admin};
pub use cron::{CronGate, DEFAULT_DELAY};
pub use registry::{GLOBAL, PluginHandle, PluginRegistry};

use slirc_wire::{Event, OutboundCommand};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::config::{Config, ConfigStore};
use crate::roster::ChannelRoster;
use crate::sender::{Commands, QuitRequest, Sender};

/// State shared by the connection and every plugin.
#[derive(Clone)]
pub struct Services {
    pub config: Arc<ConfigStore>,
    pub registry: Arc<PluginRegistry>,
    pub roster: Arc<ChannelRoster>,
    /// When the current session started.
    pub started: Instant,
}

impl Services {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self {
            config,
            registry: Arc::new(PluginRegistry::new()),
            roster: Arc::new(ChannelRoster::new()),
            started: Instant::now(),
        }
    }
}

/// What a hook sees of the running session.
pub struct Context<'a> {
    handle: &'a PluginHandle,
    event: Option<&'a Event>,
    sender: &'a mut Sender,
    services: &'a Services,
}

impl<'a> Context<'a> {
    pub fn new(
        handle: &'a PluginHandle,
        event: Option<&'a Event>,
        sender: &'a mut Sender,
        services: &'a Services,
    ) -> Self {
        Self {
            handle,
            event,
            sender,
            services,
        }
    }

    /// Name of the plugin this context belongs to.
    pub fn plugin(&self) -> &'a str {
        self.handle.name()
    }

    pub fn handle(&self) -> &'a PluginHandle {
        self.handle
    }

    /// The event being dispatched. `None` in connect, shutdown and idle
    /// tick hooks.
    pub fn event(&self) -> Option<&'a Event> {
        self.event
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<Config> {
        self.services.config.get()
    }

    pub fn config_store(&self) -> &'a ConfigStore {
        &self.services.config
    }

    pub fn registry(&self) -> &'a PluginRegistry {
        &self.services.registry
    }

    pub fn roster(&self) -> &'a ChannelRoster {
        &self.services.roster
    }

    pub fn services(&self) -> &'a Services {
        self.services
    }

    /// The bot's current nick.
    pub fn own_nick(&self) -> String {
        self.config().nick.clone()
    }

    /// Whether the current event was sent by the bot itself.
    pub fn is_own_event(&self) -> bool {
        self.event
            .is_some_and(|event| event.nick().eq_ignore_ascii_case(&self.config().nick))
    }

    /// Raw value of a setting in this plugin's `[plugin.<name>]` table.
    pub fn setting(&self, key: &str) -> Option<toml::Value> {
        self.services.config.plugin_setting(self.plugin(), key)
    }

    pub fn setting_str(&self, key: &str) -> Option<String> {
        self.config().plugin_str(self.plugin(), key)
    }

    pub fn setting_bool(&self, key: &str, default: bool) -> bool {
        self.config().plugin_bool(self.plugin(), key, default)
    }

    pub fn setting_int(&self, key: &str) -> Option<i64> {
        self.config().plugin_int(self.plugin(), key)
    }
}

impl Commands for Context<'_> {
    fn submit(&mut self, cmd: OutboundCommand) {
        if self.handle.is_muted(cmd.arguments.first().map(String::as_str)) {
            debug!(plugin = %self.plugin(), command = %cmd.command, "muted");
            return;
        }
        self.sender.submit(cmd);
    }

    fn submit_quit(&mut self, quit: QuitRequest) {
        if self.handle.is_muted(quit.reason.as_deref()) {
            debug!(plugin = %self.plugin(), command = "quit", "muted");
            return;
        }
        self.sender.submit_quit(quit);
    }
}

/// An event handler loaded into the dispatch loop.
///
/// Hooks are synchronous and run on the connection task; long work belongs
/// on a spawned task that reports back through shared state.
#[allow(unused_variables)]
pub trait Plugin: Send {
    /// Short name, also the key of the `[plugin.<name>]` settings table.
    fn name(&self) -> &str;

    fn on_connect(&mut self, ctx: &mut Context<'_>) {}
    fn on_shutdown(&mut self, ctx: &mut Context<'_>) {}
    fn on_tick(&mut self, ctx: &mut Context<'_>) {}
    fn on_raw(&mut self, ctx: &mut Context<'_>) {}
    fn on_response(&mut self, ctx: &mut Context<'_>) {}

    fn on_nick(&mut self, ctx: &mut Context<'_>) {}
    fn on_whois(&mut self, ctx: &mut Context<'_>) {}
    fn on_quit(&mut self, ctx: &mut Context<'_>) {}
    fn on_join(&mut self, ctx: &mut Context<'_>) {}
    fn on_kick(&mut self, ctx: &mut Context<'_>) {}
    fn on_part(&mut self, ctx: &mut Context<'_>) {}
    fn on_mode(&mut self, ctx: &mut Context<'_>) {}
    fn on_topic(&mut self, ctx: &mut Context<'_>) {}
    fn on_privmsg(&mut self, ctx: &mut Context<'_>) {}
    fn on_notice(&mut self, ctx: &mut Context<'_>) {}
    fn on_pong(&mut self, ctx: &mut Context<'_>) {}
    fn on_names(&mut self, ctx: &mut Context<'_>) {}
    fn on_action(&mut self, ctx: &mut Context<'_>) {}
    fn on_ctcp(&mut self, ctx: &mut Context<'_>) {}
    fn on_ctcp_reply(&mut self, ctx: &mut Context<'_>) {}
    fn on_ping_reply(&mut self, ctx: &mut Context<'_>) {}
    fn on_version_reply(&mut self, ctx: &mut Context<'_>) {}
    fn on_time_reply(&mut self, ctx: &mut Context<'_>) {}
    fn on_ping(&mut self, ctx: &mut Context<'_>) {}
    fn on_oper(&mut self, ctx: &mut Context<'_>) {}
    fn on_invite(&mut self, ctx: &mut Context<'_>) {}
    fn on_error(&mut self, ctx: &mut Context<'_>) {}
    fn on_kill(&mut self, ctx: &mut Context<'_>) {}
    fn on_version(&mut self, ctx: &mut Context<'_>) {}
    fn on_time(&mut self, ctx: &mut Context<'_>) {}
}
