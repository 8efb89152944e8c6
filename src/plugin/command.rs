//! Chat command parsing for plugins.
//!
//! A [`CommandSet`] recognizes messages of the form
//! `[<botnick>[:,>] ]<command> [params]`, checks the configured
//! `command_prefix`, gates admin-only sets and splits the parameters
//! according to each command's [`Arity`]. Plugins keep a set as a field and
//! feed it from their privmsg hook:
//!
//! ```ignore
//! fn on_privmsg(&mut self, ctx: &mut Context<'_>) {
//!     if let Some(call) = self.commands.resolve(ctx) {
//!         call.run(self, ctx);
//!     }
//! }
//! ```

use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::Context;
use crate::ignore::HostmaskSet;
use crate::sender::Commands;

/// Plugin providing channel operator status.
const ROSTER_PLUGIN: &str = "roster";

/// Handler signature: the plugin, the context and the split parameters.
pub type CommandHandler<P> = fn(&mut P, &mut Context<'_>, &[String]);

/// Parameter counts accepted by a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arity {
    /// Parameters that must be present.
    pub required: usize,
    /// Most parameters; the last one keeps the unsplit remainder.
    pub max: usize,
}

impl Arity {
    /// No parameters.
    pub const NONE: Arity = Arity {
        required: 0,
        max: 0,
    };

    pub const fn new(required: usize, max: usize) -> Self {
        Self { required, max }
    }

    /// Exactly `n` parameters.
    pub const fn exact(n: usize) -> Self {
        Self::new(n, n)
    }

    /// Up to `n` parameters, none required.
    pub const fn optional(n: usize) -> Self {
        Self::new(0, n)
    }
}

struct Entry<P> {
    arity: Arity,
    handler: CommandHandler<P>,
}

/// A resolved command, ready to run against its plugin.
pub struct Invocation<P> {
    pub command: String,
    pub params: Vec<String>,
    handler: CommandHandler<P>,
}

impl<P> Invocation<P> {
    pub fn run(self, plugin: &mut P, ctx: &mut Context<'_>) {
        (self.handler)(plugin, ctx, &self.params);
    }
}

impl<P> std::fmt::Debug for Invocation<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("command", &self.command)
            .field("params", &self.params)
            .finish()
    }
}

/// The chat commands of one plugin.
pub struct CommandSet<P> {
    commands: BTreeMap<String, Entry<P>>,
    needs_admin: bool,
    hostmask_only: bool,
}

impl<P> Default for CommandSet<P> {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
            needs_admin: false,
            hostmask_only: false,
        }
    }
}

impl<P> CommandSet<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict every command of the set to administrators.
    pub fn admin(mut self) -> Self {
        self.needs_admin = true;
        self
    }

    /// Only hostmask lists grant admin rights; channel ops do not.
    pub fn hostmask_only(mut self) -> Self {
        self.hostmask_only = true;
        self
    }

    /// Add a command. Names are case-insensitive.
    pub fn register(mut self, name: &str, arity: Arity, handler: CommandHandler<P>) -> Self {
        self.commands
            .insert(name.to_ascii_lowercase(), Entry { arity, handler });
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_ascii_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Match the current privmsg against the set.
    ///
    /// Returns `None` when the message is not one of these commands, when
    /// the parameter count does not fit, or when the sender lacks admin
    /// rights. In the last case the sender is told so with a notice.
    pub fn resolve(&self, ctx: &mut Context<'_>) -> Option<Invocation<P>> {
        let event = ctx.event()?;
        let message = event.argument(1)?;
        self.resolve_message(ctx, message)
    }

    /// Like [`resolve`](Self::resolve) for an arbitrary message body.
    pub fn resolve_message(&self, ctx: &mut Context<'_>, message: &str) -> Option<Invocation<P>> {
        let event = ctx.event()?;
        let config = ctx.config();
        let command_prefix = config.command_prefix.as_deref().map(str::trim).unwrap_or("");

        // Admin sets without a command prefix must be addressed by nick in
        // channels.
        let force_bot_prefix =
            self.needs_admin && command_prefix.is_empty() && event.source().starts_with('#');

        let matcher = command_matcher(&config.nick, force_bot_prefix)?;
        let captures = matcher.captures(message)?;
        let bot_prefixed = captures.get(1).is_some();
        let mut command = captures.get(2)?.as_str().to_lowercase();
        let params = captures.get(3).map(|m| m.as_str()).unwrap_or("");

        if !command_prefix.is_empty() {
            let has_prefix = match command.strip_prefix(command_prefix) {
                Some(stripped) => {
                    command = stripped.to_owned();
                    true
                }
                None => false,
            };
            if !has_prefix && !bot_prefixed {
                return None;
            }
        }

        let entry = self.commands.get(&command)?;

        if self.needs_admin && !from_admin(ctx, self.hostmask_only) {
            let nick = event.nick().to_owned();
            ctx.notice(
                &nick,
                &format!("You do not have permission to use the command \"{command}.\""),
            );
            return None;
        }

        let params = split_params(params, entry.arity)?;
        debug!(plugin = %ctx.plugin(), command = %command, "command");
        Some(Invocation {
            command,
            params,
            handler: entry.handler,
        })
    }
}

/// Split `params` for `arity`, or `None` when too few are present.
fn split_params(params: &str, arity: Arity) -> Option<Vec<String>> {
    if params.is_empty() {
        return (arity.required == 0).then(Vec::new);
    }

    let mut parts: Vec<String> = Vec::new();
    let mut rest = params;
    while !rest.is_empty() {
        if arity.max > 0 && parts.len() + 1 == arity.max {
            parts.push(rest.to_owned());
            break;
        }
        match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => {
                parts.push(head.to_owned());
                rest = tail.trim_start();
            }
            None => {
                parts.push(rest.to_owned());
                break;
            }
        }
    }

    (arity.required <= parts.len()).then_some(parts)
}

fn command_matcher(nick: &str, force_bot_prefix: bool) -> Option<Regex> {
    let optional = if force_bot_prefix { "" } else { "?" };
    let source = format!(
        r"^({}\s*[:,>]?\s+){}(\S+)(?:\s+(.*))?$",
        regex::escape(nick),
        optional
    );
    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(nick = %nick, error = %e, "command pattern did not compile");
            None
        }
    }
}

/// Whether the sender of the current event may run admin commands.
///
/// The sender qualifies when its hostmask matches the plugin's `admins`
/// list or the global `[admin] admins` list, or, unless `hostmask_only`,
/// when ops count as admins and the roster shows the sender as an operator
/// of the source channel. The plugin's `ops` setting overrides
/// `[admin] ops`.
pub fn from_admin(ctx: &Context<'_>, hostmask_only: bool) -> bool {
    let Some(event) = ctx.event() else {
        return false;
    };
    let config = ctx.config();

    let admins = format!(
        "{} {}",
        ctx.setting_str("admins").unwrap_or_default(),
        config.admin.admins
    );
    if HostmaskSet::new(&admins).matches(&event.hostmask()) {
        return true;
    }

    let ops = ctx.setting_bool("ops", config.admin.ops);
    !hostmask_only
        && ops
        && ctx.registry().is_loaded(ROSTER_PLUGIN)
        && ctx.roster().is_op(event.nick(), event.source())
}
