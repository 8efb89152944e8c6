//! Built-in plugins.
//!
//! These cover what the bot needs to behave as a well-mannered IRC client:
//! answering PINGs and CTCP queries, picking another nick when the
//! configured one is taken, joining channels, tracking channel membership
//! and obeying admin quit commands.

mod altnick;
mod autojoin;
mod ctcp;
mod pong;
mod quit;
mod roster;

pub use altnick::Altnick;
pub use autojoin::{Autojoin, parse_channels};
pub use ctcp::{Ctcp, format_uptime};
pub use pong::Pong;
pub use quit::{Quit, quit_reason};
pub use roster::Roster;

use tracing::{info, warn};

use crate::config::Config;
use crate::plugin::Plugin;

/// Names of every built-in plugin, in load order.
pub const BUILTIN: [&str; 6] = ["pong", "ctcp", "roster", "altnick", "autojoin", "quit"];

fn instantiate(name: &str) -> Option<Box<dyn Plugin>> {
    let plugin: Box<dyn Plugin> = match name {
        "pong" => Box::new(Pong),
        "ctcp" => Box::new(Ctcp),
        "roster" => Box::new(Roster),
        "altnick" => Box::new(Altnick::default()),
        "autojoin" => Box::new(Autojoin),
        "quit" => Box::new(Quit::new()),
        _ => return None,
    };
    Some(plugin)
}

/// Build the built-in plugins selected by the `plugins` setting.
///
/// Plugins whose requirements are not met are skipped with a warning.
pub fn builtin(config: &Config) -> Vec<Box<dyn Plugin>> {
    let selection = config.plugin_selection();

    for name in &selection.except {
        if !BUILTIN.iter().any(|b| b.eq_ignore_ascii_case(name)) {
            warn!(plugin = %name, "unknown plugin in selection");
        }
    }

    BUILTIN
        .iter()
        .filter(|name| selection.includes(name))
        .filter(|name| match requirements(config, name) {
            Ok(()) => true,
            Err(reason) => {
                warn!(plugin = %name, reason, "plugin not loaded");
                false
            }
        })
        .filter_map(|name| instantiate(name))
        .inspect(|plugin| info!(plugin = %plugin.name(), "plugin selected"))
        .collect()
}

fn requirements(config: &Config, name: &str) -> Result<(), &'static str> {
    match name {
        "autojoin" => match config.plugin_str("autojoin", "channels") {
            Some(channels) if !channels.trim().is_empty() => Ok(()),
            _ => Err("setting autojoin.channels must be filled in"),
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use slirc_wire::parse_line;
    use std::sync::Arc;

    use crate::config::ConfigStore;
    use crate::plugin::{Context, Plugin, Services};
    use crate::sender::Sender;

    /// Services for a bot named `bot`, plus extra TOML.
    pub fn services(extra: &str) -> Services {
        let toml = format!("nick = \"bot\"\n{extra}");
        Services::new(Arc::new(ConfigStore::from_toml(&toml).unwrap()))
    }

    /// Run one hook for `line` and return the lines written.
    pub fn run_with<P, F>(services: &Services, plugin: &mut P, line: &str, hook: F) -> Vec<String>
    where
        P: Plugin,
        F: FnOnce(&mut P, &mut Context<'_>),
    {
        let handle = services.registry.register(plugin.name());
        let event = parse_line(line, &services.config.get().nick);
        let mut sender = Sender::new();
        {
            let mut ctx = Context::new(&handle, Some(&event), &mut sender, services);
            hook(plugin, &mut ctx);
        }
        sender.drain().collect()
    }

    /// [`run_with`] on fresh services.
    pub fn run_hook<P, F>(plugin: &mut P, extra: &str, line: &str, hook: F) -> Vec<String>
    where
        P: Plugin,
        F: FnOnce(&mut P, &mut Context<'_>),
    {
        run_with(&services(extra), plugin, line, hook)
    }
}
