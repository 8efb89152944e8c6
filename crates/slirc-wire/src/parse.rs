//! Line classifier.
//!
//! Turns one raw line into an [`Event`]. Parsing is total: a malformed or
//! truncated line still yields an event, with missing argument positions
//! simply absent.
//!
//! Argument splitting is per command. The separator is a single space that
//! may be followed by one `:`, so `#chan :hello world` splits into
//! `#chan` and `hello world` when at most two parts are requested.

use crate::ctcp::{Ctcp, CtcpKind};
use crate::event::{Event, EventType, RequestEvent, ResponseEvent};
use crate::hostmask::Hostmask;

/// Split `rest` on `" "` / `" :"` into at most `limit` parts.
///
/// The last part keeps the unsplit remainder. An empty input yields one
/// empty part.
///
/// ```
/// use slirc_wire::parse::split_params;
///
/// assert_eq!(split_params("#a :hello world", Some(2)), ["#a", "hello world"]);
/// assert_eq!(split_params("#a +o :nick", None), ["#a", "+o", "nick"]);
/// ```
pub fn split_params(rest: &str, limit: Option<usize>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut remaining = rest;

    while !limit.is_some_and(|max| parts.len() + 1 >= max) {
        let Some(pos) = remaining.find(' ') else {
            break;
        };
        parts.push(remaining[..pos].to_owned());
        let after = &remaining[pos + 1..];
        remaining = after.strip_prefix(':').unwrap_or(after);
    }

    parts.push(remaining.to_owned());
    parts
}

/// Split numeric reply parameters the usual IRC way: space-separated
/// middles, then a `:`-led trailing parameter kept whole.
fn split_description(rest: &str) -> Vec<String> {
    let mut description = Vec::new();
    let mut remaining = rest;

    while !remaining.is_empty() {
        if let Some(trailing) = remaining.strip_prefix(':') {
            description.push(trailing.to_owned());
            break;
        }
        match remaining.split_once(' ') {
            Some((middle, tail)) => {
                if !middle.is_empty() {
                    description.push(middle.to_owned());
                }
                remaining = tail;
            }
            None => {
                description.push(remaining.to_owned());
                break;
            }
        }
    }

    description
}

/// Classify one received line.
///
/// `own_nick` is the bot's current nick; it decides whether a CTCP ACTION
/// was addressed to the bot directly or to a channel.
///
/// ```
/// use slirc_wire::{parse_line, EventType};
///
/// let event = parse_line(":bob!b@host.com PRIVMSG #room :hello world", "bot");
/// assert_eq!(event.event_type(), Some(&EventType::Privmsg));
/// assert_eq!(event.nick(), "bob");
/// assert_eq!(event.arguments(), ["#room", "hello world"]);
/// assert_eq!(event.source(), "#room");
/// ```
pub fn parse_line(line: &str, own_nick: &str) -> Event {
    let (origin, command, rest) = match line.strip_prefix(':') {
        Some(body) => {
            let mut fields = body.splitn(3, ' ');
            let prefix = fields.next().unwrap_or_default();
            let command = fields.next().unwrap_or_default();
            let rest = fields.next().unwrap_or_default();
            (Hostmask::parse(prefix), command, rest)
        }
        None => {
            let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
            (Hostmask::default(), command, rest)
        }
    };

    let command = command.to_ascii_lowercase();

    if !command.is_empty() && command.bytes().all(|b| b.is_ascii_digit()) {
        return Event::Response(ResponseEvent {
            response: command.parse().ok(),
            code: command,
            description: split_description(rest),
            rest: rest.to_owned(),
            origin,
            raw_buffer: line.to_owned(),
        });
    }

    let (kind, arguments) = classify(&command, rest, &origin, own_nick);

    Event::Request(RequestEvent {
        kind,
        arguments,
        origin,
        raw_buffer: line.to_owned(),
    })
}

fn classify(
    command: &str,
    rest: &str,
    origin: &Hostmask,
    own_nick: &str,
) -> (EventType, Vec<String>) {
    let sender = || origin.nick.clone();

    match command {
        "names" | "nick" | "quit" | "ping" | "join" | "error" => (
            EventType::from_name(command),
            vec![rest.trim_start_matches(':').to_owned()],
        ),

        "notice" => {
            let parts = split_params(rest.trim(), Some(2));
            let Some(ctcp) = parts.get(1).and_then(|body| Ctcp::unwrap(body)) else {
                return (EventType::Notice, split_params(rest, Some(2)));
            };
            match ctcp.kind {
                CtcpKind::Action => (EventType::Action, vec![sender(), ctcp.params.to_owned()]),
                CtcpKind::Ping => (EventType::PingReply, vec![sender(), ctcp.params.to_owned()]),
                CtcpKind::Version => {
                    (EventType::VersionReply, vec![sender(), ctcp.params.to_owned()])
                }
                CtcpKind::Time => (EventType::TimeReply, vec![sender(), ctcp.params.to_owned()]),
                _ => (EventType::CtcpReply, vec![sender(), ctcp.payload.to_owned()]),
            }
        }

        "oper" | "topic" | "mode" => (EventType::from_name(command), split_params(rest, None)),

        "part" | "kill" | "invite" => (EventType::from_name(command), split_params(rest, Some(2))),

        "kick" => (EventType::Kick, split_params(rest, Some(3))),

        "privmsg" => {
            let parts = split_params(rest.trim(), Some(2));
            let Some(ctcp) = parts.get(1).and_then(|body| Ctcp::unwrap(body)) else {
                return (EventType::Privmsg, split_params(rest, Some(2)));
            };
            match ctcp.kind {
                CtcpKind::Action => {
                    let target = &parts[0];
                    let source = if target.eq_ignore_ascii_case(own_nick) {
                        sender()
                    } else {
                        target.clone()
                    };
                    (EventType::Action, vec![source, ctcp.params.to_owned()])
                }
                CtcpKind::Ping if !ctcp.params.is_empty() => {
                    (EventType::Ping, vec![sender(), ctcp.params.to_owned()])
                }
                CtcpKind::Version if ctcp.params.is_empty() => {
                    (EventType::Version, vec![sender(), ctcp.payload.to_owned()])
                }
                CtcpKind::Time if ctcp.params.is_empty() => {
                    (EventType::Time, vec![sender(), ctcp.payload.to_owned()])
                }
                _ => (EventType::Ctcp, vec![sender(), ctcp.payload.to_owned()]),
            }
        }

        _ => (EventType::from_name(command), split_params(rest, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(event: &Event) -> Vec<&str> {
        event.arguments().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_split_params_limits() {
        assert_eq!(split_params("a b c", None), ["a", "b", "c"]);
        assert_eq!(split_params("a b c", Some(2)), ["a", "b c"]);
        assert_eq!(split_params("a b c", Some(1)), ["a b c"]);
        assert_eq!(split_params("", None), [""]);
    }

    #[test]
    fn test_split_params_consumes_single_colon() {
        assert_eq!(split_params("#c ::-)", Some(2)), ["#c", ":-)"]);
        assert_eq!(split_params("#c victim :bye now", Some(3)), ["#c", "victim", "bye now"]);
    }

    #[test]
    fn test_split_description() {
        assert_eq!(
            split_description("* newnick :Nickname is already in use."),
            ["*", "newnick", "Nickname is already in use."]
        );
        assert_eq!(split_description("bot = #chan :@op +voice plain"), [
            "bot",
            "=",
            "#chan",
            "@op +voice plain"
        ]);
        assert!(split_description("").is_empty());
    }

    #[test]
    fn test_single_argument_commands_strip_colon() {
        let event = parse_line(":bob!b@h JOIN :#room", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Join));
        assert_eq!(args(&event), ["#room"]);

        let event = parse_line(":bob!b@h QUIT :Gone to lunch", "bot");
        assert_eq!(args(&event), ["Gone to lunch"]);
        assert_eq!(event.argument("message"), Some("Gone to lunch"));
    }

    #[test]
    fn test_ping_from_server() {
        let event = parse_line("PING :server.example.com", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Ping));
        assert_eq!(args(&event), ["server.example.com"]);
        assert!(event.is_from_server());
        assert_eq!(event.nick(), "");
    }

    #[test]
    fn test_numeric_reply() {
        let event = parse_line(":server 433 * newnick :Nickname is already in use.", "bot");
        let resp = event.as_response().unwrap();
        assert_eq!(resp.code, "433");
        assert_eq!(resp.response, Some(crate::Response::ERR_NICKNAMEINUSE));
        assert_eq!(resp.rest, "* newnick :Nickname is already in use.");
        assert_eq!(resp.origin.host, "server");
    }

    #[test]
    fn test_unknown_numeric_keeps_code() {
        let event = parse_line(":server 999 bot :whatever", "bot");
        let resp = event.as_response().unwrap();
        assert_eq!(resp.code, "999");
        assert_eq!(resp.response, None);
    }

    #[test]
    fn test_kick_three_parts() {
        let event = parse_line(":op!o@h KICK #chan victim :bye bye", "bot");
        assert_eq!(args(&event), ["#chan", "victim", "bye bye"]);
        assert_eq!(event.argument("comment"), Some("bye bye"));
    }

    #[test]
    fn test_mode_unlimited() {
        let event = parse_line(":op!o@h MODE #chan +ov alice bob", "bot");
        assert_eq!(args(&event), ["#chan", "+ov", "alice", "bob"]);
    }

    #[test]
    fn test_part_two_parts() {
        let event = parse_line(":bob!b@h PART #chan :see you all", "bot");
        assert_eq!(args(&event), ["#chan", "see you all"]);
        assert_eq!(event.argument("message"), Some("see you all"));
    }

    #[test]
    fn test_plain_notice() {
        let event = parse_line(":srv NOTICE * :*** Looking up your hostname", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Notice));
        assert_eq!(args(&event), ["*", "*** Looking up your hostname"]);
    }

    #[test]
    fn test_private_action_source_is_sender() {
        let event = parse_line(":bob!b@h PRIVMSG Bot :\x01ACTION waves\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Action));
        assert_eq!(args(&event), ["bob", "waves"]);
    }

    #[test]
    fn test_ctcp_ping_with_handshake() {
        let event = parse_line(":bob!b@h PRIVMSG bot :\x01PING 1234\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Ping));
        assert_eq!(args(&event), ["bob", "1234"]);
        assert!(event.is_from_user());
    }

    #[test]
    fn test_ctcp_version_and_time_queries() {
        let event = parse_line(":bob!b@h PRIVMSG bot :\x01VERSION\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Version));
        assert_eq!(args(&event), ["bob", "VERSION"]);

        let event = parse_line(":bob!b@h PRIVMSG bot :\x01TIME\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Time));
    }

    #[test]
    fn test_ctcp_with_unexpected_params_is_generic() {
        let event = parse_line(":bob!b@h PRIVMSG bot :\x01VERSION please\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Ctcp));
        assert_eq!(args(&event), ["bob", "VERSION please"]);

        let event = parse_line(":bob!b@h PRIVMSG bot :\x01PING\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Ctcp));
        assert_eq!(args(&event), ["bob", "PING"]);

        let event = parse_line(":bob!b@h PRIVMSG bot :\x01FINGER\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Ctcp));
    }

    #[test]
    fn test_ctcp_replies_in_notice() {
        let event = parse_line(":bob!b@h NOTICE bot :\x01VERSION irssi 1.4\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::VersionReply));
        assert_eq!(args(&event), ["bob", "irssi 1.4"]);

        let event = parse_line(":bob!b@h NOTICE bot :\x01PING 1234\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::PingReply));

        let event = parse_line(":bob!b@h NOTICE bot :\x01TIME Mon Jan 01\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::TimeReply));
        assert_eq!(args(&event), ["bob", "Mon Jan 01"]);

        let event = parse_line(":bob!b@h NOTICE bot :\x01USERINFO none\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::CtcpReply));
        assert_eq!(args(&event), ["bob", "USERINFO none"]);
    }

    #[test]
    fn test_notice_action() {
        let event = parse_line(":bob!b@h NOTICE #c :\x01ACTION shrugs\x01", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Action));
        assert_eq!(args(&event), ["bob", "shrugs"]);
    }

    #[test]
    fn test_half_delimited_body_is_plain_privmsg() {
        let event = parse_line(":bob!b@h PRIVMSG #c :\x01ACTION waves", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Privmsg));
        assert_eq!(args(&event), ["#c", "\x01ACTION waves"]);
    }

    #[test]
    fn test_empty_and_truncated_lines_do_not_panic() {
        for line in ["", ":", ":prefix", ":a!b@c PRIVMSG", "PRIVMSG", "NOTICE", "KICK", "001"] {
            let event = parse_line(line, "bot");
            assert_eq!(event.raw_buffer(), line);
            assert_eq!(event.argument(5), None);
        }
    }

    #[test]
    fn test_unknown_command_kept_verbatim() {
        let event = parse_line(":srv CAP * LS :multi-prefix", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Other("cap".into())));
        assert_eq!(args(&event), ["*", "LS", "multi-prefix"]);
    }

    #[test]
    fn test_command_case_insensitive() {
        let event = parse_line(":bob!b@h privmsg #c :hi", "bot");
        assert_eq!(event.event_type(), Some(&EventType::Privmsg));
    }
}
