//! Answers CTCP queries.

use std::time::Duration;

use crate::plugin::{Context, Plugin};
use crate::sender::Commands;

/// Render a duration as `1d 2h 3m 4s`, leaving out zero units.
pub fn format_uptime(elapsed: Duration) -> String {
    let mut secs = elapsed.as_secs();
    let mut parts = Vec::new();
    for (unit, size) in [("d", 86_400), ("h", 3_600), ("m", 60)] {
        let count = secs / size;
        if count > 0 {
            parts.push(format!("{count}{unit}"));
            secs %= size;
        }
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }
    parts.join(" ")
}

/// Replies to CTCP TIME, VERSION, PING, SOURCE, FINGER and UPTIME.
#[derive(Debug, Default)]
pub struct Ctcp;

impl Plugin for Ctcp {
    fn name(&self) -> &str {
        "ctcp"
    }

    fn on_time(&mut self, ctx: &mut Context<'_>) {
        if let Some(event) = ctx.event() {
            ctx.time_reply(event.source(), "");
        }
    }

    fn on_version(&mut self, ctx: &mut Context<'_>) {
        if let Some(event) = ctx.event() {
            let version = ctx.setting_str("version").unwrap_or_default();
            ctx.version_reply(event.source(), &version);
        }
    }

    fn on_ping(&mut self, ctx: &mut Context<'_>) {
        let Some(event) = ctx.event() else {
            return;
        };
        match event.argument(1) {
            Some(handshake) if !handshake.is_empty() => ctx.ping_reply(event.source(), handshake),
            // Server ping, answered by the pong plugin
            _ => {}
        }
    }

    fn on_ctcp(&mut self, ctx: &mut Context<'_>) {
        let Some(event) = ctx.event() else {
            return;
        };
        let source = event.source();
        let request = event.argument(1).unwrap_or("").trim().to_ascii_uppercase();

        match request.as_str() {
            "PING" => ctx.ctcp_reply(source, "pong", ""),
            "SOURCE" => {
                let url = ctx
                    .setting_str("source")
                    .unwrap_or_else(|| env!("CARGO_PKG_REPOSITORY").to_owned());
                ctx.ctcp_reply(source, "source", &url);
            }
            "FINGER" => {
                let config = ctx.config();
                let or_nick = |value: &str| {
                    if value.is_empty() {
                        config.nick.clone()
                    } else {
                        value.to_owned()
                    }
                };
                let finger = format!("{} ({})", or_nick(&config.realname), or_nick(&config.username));
                ctx.ctcp_reply(source, "finger", &finger);
            }
            "UPTIME" => {
                let uptime = format_uptime(ctx.services().started.elapsed());
                ctx.ctcp_reply(source, "uptime", &uptime);
            }
            _ => {}
        }
    }
}
