//! Feeds the shared [`ChannelRoster`](crate::roster::ChannelRoster).

use slirc_wire::Response;

use crate::plugin::{Context, Plugin};

#[derive(Debug, Default)]
pub struct Roster;

impl Roster {
    /// Drop the channel when the bot itself leaves, else just the member.
    fn leave(ctx: &Context<'_>, channel: &str, nick: &str) {
        if nick.trim().eq_ignore_ascii_case(&ctx.own_nick()) {
            ctx.roster().forget(channel);
        } else {
            ctx.roster().part(channel, nick);
        }
    }
}

impl Plugin for Roster {
    fn name(&self) -> &str {
        "roster"
    }

    fn on_connect(&mut self, ctx: &mut Context<'_>) {
        ctx.roster().clear();
    }

    fn on_response(&mut self, ctx: &mut Context<'_>) {
        let Some(reply) = ctx.event().and_then(|event| event.as_response()) else {
            return;
        };
        if !reply.is(Response::RPL_NAMREPLY) {
            return;
        }
        // <me> [=*@] <channel> :<names>
        if let [.., channel, names] = reply.description.as_slice() {
            ctx.roster().names(channel, names);
        }
    }

    fn on_join(&mut self, ctx: &mut Context<'_>) {
        if let Some(event) = ctx.event() {
            if let Some(channel) = event.argument("channel") {
                ctx.roster().join(channel, event.nick());
            }
        }
    }

    fn on_part(&mut self, ctx: &mut Context<'_>) {
        if let Some(event) = ctx.event() {
            if let Some(channel) = event.argument("channel") {
                Self::leave(ctx, channel, event.nick());
            }
        }
    }

    fn on_kick(&mut self, ctx: &mut Context<'_>) {
        if let Some(event) = ctx.event() {
            if let (Some(channel), Some(user)) = (event.argument("channel"), event.argument("user")) {
                Self::leave(ctx, channel, user);
            }
        }
    }

    fn on_quit(&mut self, ctx: &mut Context<'_>) {
        if let Some(event) = ctx.event() {
            ctx.roster().quit(event.nick());
        }
    }

    fn on_nick(&mut self, ctx: &mut Context<'_>) {
        if let Some(event) = ctx.event() {
            if let Some(new) = event.argument(0) {
                ctx.roster().rename(event.nick(), new);
            }
        }
    }

    fn on_mode(&mut self, ctx: &mut Context<'_>) {
        let Some(event) = ctx.event() else {
            return;
        };
        if let [channel, modes, targets @ ..] = event.arguments() {
            if channel.starts_with('#') && !targets.is_empty() {
                ctx.roster().mode(channel, modes, targets);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::{run_with, services};

    fn feed(services: &crate::plugin::Services, lines: &[&str]) {
        let mut plugin = Roster;
        for line in lines {
            run_with(services, &mut plugin, line, |p, c| {
                let event = c.event().cloned();
                match event.as_ref().and_then(|e| e.event_type()) {
                    None => p.on_response(c),
                    Some(kind) => {
                        crate::network::type_hook(p, kind, c);
                    }
                }
            });
        }
    }

    #[test]
    fn test_tracks_membership() {
        let services = services("");
        feed(
            &services,
            &[
                ":server 353 bot = #rust :bot @alice +bob",
                ":carol!c@h JOIN :#rust",
                ":alice!a@h MODE #rust +v-o carol alice",
                ":bob!b@h NICK :robert",
                ":carol!c@h PART #rust :later",
            ],
        );

        let roster = &services.roster;
        assert_eq!(roster.users("#rust").unwrap(), ["alice", "bot", "robert"]);
        assert!(roster.is_voice("robert", "#rust"));
        assert!(!roster.is_op("alice", "#rust"));
    }

    #[test]
    fn test_bot_kicked_forgets_channel() {
        let services = services("");
        feed(
            &services,
            &[
                ":server 353 bot @ #ops :bot chief",
                ":chief!c@h KICK #ops bot :out",
            ],
        );
        assert!(services.roster.users("#ops").is_none());
    }

    #[test]
    fn test_quit_removes_everywhere() {
        let services = services("");
        feed(
            &services,
            &[
                ":server 353 bot = #a :bot dave",
                ":server 353 bot = #b :dave",
                ":dave!d@h QUIT :gone",
            ],
        );
        assert!(services.roster.channels_of("dave").is_empty());
    }
}
