//! Event dispatch to plugins.
//!
//! The dispatcher owns the loaded plugins and walks them in load order for
//! every event. Generic hooks (`on_raw`, `on_tick`, `on_response`) always
//! run for enabled plugins; the type-specific hook is skipped when the
//! sender's hostmask is on the ignore list.

use slirc_wire::{Event, EventType};
use tracing::{debug, trace};

use crate::ignore::HostmaskSet;
use crate::plugin::{Context, Plugin, PluginHandle, Services};
use crate::sender::Sender;
use crate::telemetry::spans;

struct LoadedPlugin {
    handle: PluginHandle,
    plugin: Box<dyn Plugin>,
}

/// Loaded plugins plus the services they share.
pub struct Dispatcher {
    plugins: Vec<LoadedPlugin>,
    services: Services,
}

impl Dispatcher {
    pub fn new(services: Services) -> Self {
        Self {
            plugins: Vec::new(),
            services,
        }
    }

    /// Load a plugin after the ones already loaded.
    pub fn load(&mut self, plugin: Box<dyn Plugin>) -> PluginHandle {
        let handle = self.services.registry.register(plugin.name());
        debug!(plugin = %handle.name(), "plugin loaded");
        self.plugins.push(LoadedPlugin {
            handle: handle.clone(),
            plugin,
        });
        handle
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run `on_connect` on every plugin.
    pub fn connect(&mut self, sender: &mut Sender) {
        self.each(sender, None, |plugin, ctx| plugin.on_connect(ctx));
    }

    /// Run `on_shutdown` on every plugin.
    pub fn shutdown(&mut self, sender: &mut Sender) {
        self.each(sender, None, |plugin, ctx| plugin.on_shutdown(ctx));
    }

    /// Idle tick: `on_tick` on every plugin, enabled or not.
    pub fn tick(&mut self, sender: &mut Sender) {
        self.each(sender, None, |plugin, ctx| plugin.on_tick(ctx));
    }

    /// Hand one event to every enabled plugin.
    pub fn dispatch(&mut self, event: &Event, sender: &mut Sender) {
        let ignore = HostmaskSet::new(&self.services.config.get().ignore);
        let ignored = !ignore.is_empty() && ignore.matches(&event.hostmask());
        if ignored {
            debug!(hostmask = %event.hostmask(), "ignored sender");
        }

        for loaded in &mut self.plugins {
            if !loaded.handle.is_enabled() {
                trace!(plugin = %loaded.handle.name(), "disabled, skipped");
                continue;
            }
            let _span = spans::plugin(loaded.handle.name()).entered();
            let mut ctx = Context::new(&loaded.handle, Some(event), sender, &self.services);
            let plugin = loaded.plugin.as_mut();

            plugin.on_raw(&mut ctx);
            plugin.on_tick(&mut ctx);
            match event {
                Event::Response(_) => plugin.on_response(&mut ctx),
                Event::Request(request) if !ignored => {
                    type_hook(plugin, &request.kind, &mut ctx);
                }
                Event::Request(_) => {}
            }
        }
    }

    fn each<F>(&mut self, sender: &mut Sender, event: Option<&Event>, mut hook: F)
    where
        F: FnMut(&mut dyn Plugin, &mut Context<'_>),
    {
        for loaded in &mut self.plugins {
            let _span = spans::plugin(loaded.handle.name()).entered();
            let mut ctx = Context::new(&loaded.handle, event, sender, &self.services);
            hook(loaded.plugin.as_mut(), &mut ctx);
        }
    }
}

/// Call the hook for a request type. Returns false for types without one.
///
/// `raw` has no separate hook since `on_raw` already ran, and commands
/// outside the vocabulary only reach the generic hooks.
pub fn type_hook(plugin: &mut dyn Plugin, kind: &EventType, ctx: &mut Context<'_>) -> bool {
    match kind {
        EventType::Nick => plugin.on_nick(ctx),
        EventType::Whois => plugin.on_whois(ctx),
        EventType::Quit => plugin.on_quit(ctx),
        EventType::Join => plugin.on_join(ctx),
        EventType::Kick => plugin.on_kick(ctx),
        EventType::Part => plugin.on_part(ctx),
        EventType::Mode => plugin.on_mode(ctx),
        EventType::Topic => plugin.on_topic(ctx),
        EventType::Privmsg => plugin.on_privmsg(ctx),
        EventType::Notice => plugin.on_notice(ctx),
        EventType::Pong => plugin.on_pong(ctx),
        EventType::Names => plugin.on_names(ctx),
        EventType::Action => plugin.on_action(ctx),
        EventType::Ctcp => plugin.on_ctcp(ctx),
        EventType::CtcpReply => plugin.on_ctcp_reply(ctx),
        EventType::PingReply => plugin.on_ping_reply(ctx),
        EventType::VersionReply => plugin.on_version_reply(ctx),
        EventType::TimeReply => plugin.on_time_reply(ctx),
        EventType::Ping => plugin.on_ping(ctx),
        EventType::Oper => plugin.on_oper(ctx),
        EventType::Invite => plugin.on_invite(ctx),
        EventType::Error => plugin.on_error(ctx),
        EventType::Kill => plugin.on_kill(ctx),
        EventType::Version => plugin.on_version(ctx),
        EventType::Time => plugin.on_time(ctx),
        EventType::Raw | EventType::Other(_) => return false,
    }
    true
}
