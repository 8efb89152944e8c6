//! Falls back to alternate nicks when the configured one is taken.
//!
//! Alternates come from `[plugin.altnick]` as `altnick0`, `altnick1`, and
//! so on, tried in order on every 433 reply. When they run out the bot
//! quits.

use slirc_wire::Response;
use tracing::{info, warn};

use crate::plugin::{Context, Plugin};
use crate::sender::Commands;

pub const EXHAUSTED_REASON: &str = "All specified nicks are in use";

#[derive(Debug, Default)]
pub struct Altnick {
    /// Index of the next alternate to try.
    next: usize,
}

impl Plugin for Altnick {
    fn name(&self) -> &str {
        "altnick"
    }

    fn on_response(&mut self, ctx: &mut Context<'_>) {
        let in_use = ctx
            .event()
            .and_then(|event| event.as_response())
            .is_some_and(|response| response.is(Response::ERR_NICKNAMEINUSE));
        if !in_use {
            return;
        }

        let key = format!("altnick{}", self.next);
        self.next += 1;

        match ctx.setting_str(&key).filter(|nick| !nick.trim().is_empty()) {
            Some(nick) => {
                let nick = nick.trim();
                info!(nick = %nick, "nick in use, trying alternate");
                ctx.urgent().nick(nick);
                if let Err(e) = ctx.config_store().set("nick", nick) {
                    warn!(error = %e, "could not record alternate nick");
                }
            }
            None => ctx.quit(Some(EXHAUSTED_REASON), false),
        }
    }
}
