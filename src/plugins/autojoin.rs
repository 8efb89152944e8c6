//! Joins configured channels once the server is ready.
//!
//! `[plugin.autojoin]` settings:
//!
//! - `channels`: comma separated channel list, optionally followed by
//!   whitespace and the comma separated keys
//! - `invite`: join channels the bot is invited to (default true)
//! - `kick`: rejoin after being kicked (default true)

use slirc_wire::Response;

use crate::plugin::{Context, Plugin};
use crate::sender::Commands;

/// Split a channel setting into the channel list and optional key list.
///
/// Whitespace after commas is dropped first, so `#a, #b key` names two
/// channels.
pub fn parse_channels(setting: &str) -> Option<(String, Option<String>)> {
    let mut normalized = String::with_capacity(setting.len());
    let mut after_comma = false;
    for c in setting.trim().chars() {
        if after_comma && c.is_whitespace() {
            continue;
        }
        after_comma = c == ',';
        normalized.push(c);
    }

    let mut parts = normalized.splitn(2, char::is_whitespace);
    let channels = parts.next().filter(|c| !c.is_empty())?.to_owned();
    let keys = parts
        .next()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned);
    Some((channels, keys))
}

#[derive(Debug, Default)]
pub struct Autojoin;

impl Plugin for Autojoin {
    fn name(&self) -> &str {
        "autojoin"
    }

    fn on_response(&mut self, ctx: &mut Context<'_>) {
        let ready = ctx
            .event()
            .and_then(|event| event.as_response())
            .is_some_and(|r| r.is(Response::RPL_ENDOFMOTD) || r.is(Response::ERR_NOMOTD));
        if !ready {
            return;
        }
        let setting = ctx.setting_str("channels").unwrap_or_default();
        if let Some((channels, keys)) = parse_channels(&setting) {
            ctx.join(&channels, keys.as_deref());
        }
    }

    fn on_invite(&mut self, ctx: &mut Context<'_>) {
        if !ctx.setting_bool("invite", true) {
            return;
        }
        if let Some(channel) = ctx.event().and_then(|event| event.argument(1)) {
            ctx.join(channel, None);
        }
    }

    fn on_kick(&mut self, ctx: &mut Context<'_>) {
        if !ctx.setting_bool("kick", true) {
            return;
        }
        let Some(event) = ctx.event() else {
            return;
        };
        let kicked_self = event
            .argument("user")
            .is_some_and(|user| user.eq_ignore_ascii_case(&ctx.own_nick()));
        if let (true, Some(channel)) = (kicked_self, event.argument("channel")) {
            ctx.join(channel, None);
        }
    }
}
