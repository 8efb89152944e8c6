//! Admin commands that end or restart the session.
//!
//! `quit`, `die` and `exit` leave the server; `reconnect` leaves and asks
//! the supervisor to connect again, and only hostmask admins may use it.

use rand::seq::SliceRandom;

use crate::plugin::{Arity, CommandSet, Context, Plugin, from_admin};
use crate::sender::Commands;

const CANNED: [&str; 5] = [
    "I'll be back.",
    "I shall return.",
    "Look to my coming at first light on the fifth day. At dawn look to the East.",
    "kthx, brb.",
    "Beam me up, Scotty!",
];

const BY_REQUEST: &str = "by request of %nick%";

pub struct Quit {
    commands: CommandSet<Quit>,
}

impl Default for Quit {
    fn default() -> Self {
        Self::new()
    }
}

impl Quit {
    pub fn new() -> Self {
        let commands = CommandSet::new()
            .admin()
            .register("quit", Arity::optional(1), Quit::leave)
            .register("die", Arity::optional(1), Quit::leave)
            .register("exit", Arity::optional(1), Quit::leave)
            .register("reconnect", Arity::optional(1), Quit::reconnect);
        Self { commands }
    }

    fn leave(&mut self, ctx: &mut Context<'_>, params: &[String]) {
        let message = params.first().map(String::as_str).unwrap_or("");
        self.handle_quit(ctx, message, false);
    }

    fn reconnect(&mut self, ctx: &mut Context<'_>, params: &[String]) {
        if !from_admin(ctx, true) {
            if let Some(event) = ctx.event() {
                ctx.notice(event.nick(), "You do not have permission to use reconnect.");
            }
            return;
        }
        let message = params.first().map(String::as_str).unwrap_or("");
        self.handle_quit(ctx, message, true);
    }

    fn handle_quit(&mut self, ctx: &mut Context<'_>, message: &str, reconnect: bool) {
        let nick = ctx.event().map(|event| event.nick()).unwrap_or("");
        let reason = quit_reason(message, ctx.setting_str("reason").as_deref(), reconnect, nick);
        ctx.quit(Some(&reason), reconnect);
    }
}

/// Pick the quit message.
///
/// An explicit message wins; otherwise a plain quit uses the `reason`
/// setting and then "by request of <nick>", while a reconnect picks a canned
/// farewell. Surrounding parentheses are dropped and `%nick%` expands to the
/// requesting nick.
pub fn quit_reason(message: &str, configured: Option<&str>, reconnect: bool, nick: &str) -> String {
    let mut message = if !message.trim().is_empty() || reconnect {
        message.trim()
    } else {
        configured.unwrap_or("").trim()
    };
    if let Some(inner) = message.strip_prefix('(').and_then(|m| m.strip_suffix(')')) {
        message = inner;
    }
    if !reconnect && message.is_empty() {
        message = BY_REQUEST;
    }
    if message.is_empty() {
        message = CANNED.choose(&mut rand::thread_rng()).copied().unwrap_or(CANNED[0]);
    }
    message.trim().replace("%nick%", nick)
}

impl Plugin for Quit {
    fn name(&self) -> &str {
        "quit"
    }

    fn on_privmsg(&mut self, ctx: &mut Context<'_>) {
        if let Some(call) = self.commands.resolve(ctx) {
            call.run(self, ctx);
        }
    }
}
