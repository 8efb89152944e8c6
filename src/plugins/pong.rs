//! Answers server PINGs.

use crate::plugin::{Context, Plugin};
use crate::sender::Commands;

#[derive(Debug, Default)]
pub struct Pong;

impl Plugin for Pong {
    fn name(&self) -> &str {
        "pong"
    }

    fn on_ping(&mut self, ctx: &mut Context<'_>) {
        let Some(event) = ctx.event() else {
            return;
        };
        // A handshake argument means a CTCP PING, which the ctcp plugin owns
        if event.argument(1).is_some_and(|h| !h.is_empty()) {
            return;
        }
        if let Some(daemon) = event.argument(0) {
            ctx.pong(daemon);
        }
    }
}
