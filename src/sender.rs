//! Outbound command queue.
//!
//! During a dispatch cycle the sender runs in queueing mode. A command is
//! held back when it is destructive (nick, kill, part, quit) XOR flagged
//! priority; everything else is serialized immediately. So by default
//! ordinary output goes out at once, while nick changes, parts and quits
//! wait until every plugin has seen the event. The priority flag inverts
//! that for a single command.
//!
//! At the end of the cycle [`Sender::flush`] writes the held commands:
//! held non-destructive commands in [`PRIORITY_ORDER`], then held commands
//! the table does not know about in submission order, then the destructive
//! ones as kill, part, nick. A held quit is handed back to the caller,
//! which runs shutdown hooks before sending it.
//!
//! The sender never touches the socket. Serialized lines collect in an
//! outbox that the connection drains after every plugin hook.

use std::collections::VecDeque;
use std::collections::vec_deque::Drain;

use chrono::{DateTime, Local, TimeZone};
use slirc_wire::{Ctcp, OutboundCommand};
use tracing::debug;

/// Flush order for held commands.
pub const PRIORITY_ORDER: [&str; 25] = [
    "raw", "pass", "user", "pong", "notice", "join", "list", "names", "version", "stats", "links",
    "time", "trace", "admin", "info", "who", "whois", "whowas", "mode", "privmsg", "nick",
    "topic", "invite", "kill", "part",
];

/// Commands held until the end of a dispatch cycle by default.
pub const DESTRUCTIVE: [&str; 4] = ["nick", "kill", "part", "quit"];

/// Flush order for held destructive commands (quit is handled separately).
const DESTRUCTIVE_FLUSH_ORDER: [&str; 3] = ["kill", "part", "nick"];

/// Default CTCP VERSION answer.
pub const DEFAULT_VERSION: &str = concat!(
    "slircbot ",
    env!("CARGO_PKG_VERSION"),
    " - An IRC bot written in Rust"
);

/// CTCP TIME format.
const TIME_REPLY_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

fn is_destructive(command: &str) -> bool {
    DESTRUCTIVE.contains(&command)
}

/// A quit that was held for the end of the cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuitRequest {
    pub reason: Option<String>,
    /// `Some(true)` asks the supervisor to reconnect, `Some(false)` to stop.
    /// `None` leaves the session's default outcome in place.
    pub reconnect: Option<bool>,
    pub priority: bool,
}

/// Everything that can issue commands.
///
/// Implementors only provide [`submit`](Commands::submit) and
/// [`submit_quit`](Commands::submit_quit); the wrappers are shared.
/// Absent optional arguments are left off the wire instead of being sent
/// empty.
pub trait Commands {
    /// Hand one command to the queue.
    fn submit(&mut self, cmd: OutboundCommand);

    /// Hand a quit to the queue.
    fn submit_quit(&mut self, quit: QuitRequest);

    /// Priority flag applied by the wrappers.
    fn priority(&self) -> bool {
        false
    }

    /// Issue the wrappers of this value with the priority flag set.
    fn urgent(&mut self) -> Urgent<'_, Self>
    where
        Self: Sized,
    {
        Urgent(self)
    }

    /// Send an arbitrary command.
    fn send<I, S>(&mut self, command: &str, arguments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cmd = OutboundCommand::new(command, arguments).with_priority(self.priority());
        self.submit(cmd);
    }

    fn join(&mut self, channel: &str, key: Option<&str>) {
        self.send("join", std::iter::once(channel).chain(key));
    }

    fn part(&mut self, channel: &str, reason: Option<&str>) {
        self.send("part", std::iter::once(channel).chain(reason));
    }

    fn invite(&mut self, nick: &str, channel: &str) {
        self.send("invite", [nick, channel]);
    }

    /// Request NAMES for a comma-separated channel list.
    fn names(&mut self, channels: &str) {
        self.send("names", [channels]);
    }

    fn list(&mut self, channels: Option<&str>) {
        self.send("list", channels);
    }

    fn topic(&mut self, channel: &str, topic: Option<&str>) {
        self.send("topic", std::iter::once(channel).chain(topic));
    }

    fn mode(&mut self, target: &str, mode: Option<&str>) {
        self.send("mode", std::iter::once(target).chain(mode));
    }

    fn nick(&mut self, nick: &str) {
        self.send("nick", [nick]);
    }

    fn whois(&mut self, nick: &str) {
        self.send("whois", [nick]);
    }

    fn privmsg(&mut self, target: &str, text: &str) {
        self.send("privmsg", [target, text]);
    }

    fn notice(&mut self, target: &str, text: &str) {
        self.send("notice", [target, text]);
    }

    /// Kick `nick` from `channel`.
    fn kick(&mut self, nick: &str, channel: &str, reason: Option<&str>) {
        self.send("kick", [channel, nick].into_iter().chain(reason));
    }

    fn pong(&mut self, daemon: &str) {
        self.send("pong", [daemon]);
    }

    /// CTCP request: PRIVMSG `\x01COMMAND args\x01`.
    fn ctcp(&mut self, target: &str, command: &str, args: &str) {
        let body = Ctcp::wrap(command, args);
        self.privmsg(target, &body);
    }

    /// `/me` action.
    fn action(&mut self, target: &str, text: &str) {
        self.ctcp(target, "action", text);
    }

    /// CTCP reply: NOTICE `\x01COMMAND reply\x01`. Nothing is sent for an
    /// empty command.
    fn ctcp_reply(&mut self, target: &str, command: &str, reply: &str) {
        let command = command.trim();
        if command.is_empty() {
            return;
        }
        let body = Ctcp::wrap(command, reply);
        self.notice(target, &body);
    }

    fn ping_reply(&mut self, target: &str, handshake: &str) {
        self.ctcp_reply(target, "ping", handshake);
    }

    /// Answer CTCP VERSION; an empty `version` sends [`DEFAULT_VERSION`].
    fn version_reply(&mut self, target: &str, version: &str) {
        let version = match version.trim() {
            "" => DEFAULT_VERSION,
            v => v,
        };
        self.ctcp_reply(target, "version", version);
    }

    /// Answer CTCP TIME. An empty `time` sends the current local time; an
    /// all-digit `time` is formatted as a Unix timestamp.
    fn time_reply(&mut self, target: &str, time: &str) {
        let time = format_time_reply(time);
        self.ctcp_reply(target, "time", &time);
    }

    /// Send a line verbatim.
    fn raw(&mut self, line: &str) {
        self.send("raw", [line]);
    }

    /// Leave the server, optionally asking the supervisor to reconnect.
    fn quit(&mut self, reason: Option<&str>, reconnect: bool) {
        let quit = QuitRequest {
            reason: reason.map(str::to_owned),
            reconnect: Some(reconnect),
            priority: self.priority(),
        };
        self.submit_quit(quit);
    }
}

/// Render a CTCP TIME answer.
pub fn format_time_reply(time: &str) -> String {
    let time = time.trim();
    let stamp: Option<DateTime<Local>> = if time.is_empty() {
        Some(Local::now())
    } else if time.bytes().all(|b| b.is_ascii_digit()) {
        time.parse::<i64>()
            .ok()
            .and_then(|secs| Local.timestamp_opt(secs, 0).single())
    } else {
        None
    };

    match stamp {
        Some(stamp) => stamp.format(TIME_REPLY_FORMAT).to_string(),
        None => time.to_owned(),
    }
}

/// Adapter that sets the priority flag on every wrapper call.
pub struct Urgent<'a, C>(&'a mut C);

impl<C: Commands> Commands for Urgent<'_, C> {
    fn submit(&mut self, cmd: OutboundCommand) {
        self.0.submit(cmd);
    }

    fn submit_quit(&mut self, quit: QuitRequest) {
        self.0.submit_quit(quit);
    }

    fn priority(&self) -> bool {
        true
    }
}

/// The per-connection command queue.
#[derive(Debug, Default)]
pub struct Sender {
    queueing: bool,
    /// Held commands, bucketed by command name in first-submission order.
    held: Vec<(String, Vec<OutboundCommand>)>,
    quit: Option<QuitRequest>,
    outbox: VecDeque<String>,
}

impl Sender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a dispatch cycle: drop anything still held and enter queueing
    /// mode.
    pub fn begin_cycle(&mut self) {
        self.held.clear();
        self.quit = None;
        self.queueing = true;
    }

    pub fn is_queueing(&self) -> bool {
        self.queueing
    }

    /// Leave queueing mode and write every held command.
    ///
    /// Returns the held quit, if any. It is not sent: the caller runs the
    /// shutdown hooks first and then submits it again.
    pub fn flush(&mut self) -> Option<QuitRequest> {
        self.queueing = false;
        let mut held = std::mem::take(&mut self.held);

        let mut take_bucket = |name: &str| {
            held.iter()
                .position(|(command, _)| command == name)
                .map(|index| held.remove(index).1)
        };

        let mut ordered: Vec<OutboundCommand> = Vec::new();
        for name in PRIORITY_ORDER.iter().filter(|name| !is_destructive(name)) {
            ordered.extend(take_bucket(*name).into_iter().flatten());
        }
        let mut destructive: Vec<OutboundCommand> = Vec::new();
        for name in DESTRUCTIVE_FLUSH_ORDER {
            destructive.extend(take_bucket(name).into_iter().flatten());
        }
        ordered.extend(held.into_iter().flat_map(|(_, bucket)| bucket));
        ordered.extend(destructive);

        for cmd in &ordered {
            self.emit(cmd);
        }

        self.quit.take()
    }

    /// Serialized lines waiting to be written.
    pub fn drain(&mut self) -> Drain<'_, String> {
        self.outbox.drain(..)
    }

    pub fn has_output(&self) -> bool {
        !self.outbox.is_empty()
    }

    fn hold(&mut self, cmd: OutboundCommand) {
        match self.held.iter_mut().find(|(name, _)| *name == cmd.command) {
            Some((_, bucket)) => bucket.push(cmd),
            None => self.held.push((cmd.command.clone(), vec![cmd])),
        }
    }

    fn emit(&mut self, cmd: &OutboundCommand) {
        if let Some(line) = cmd.to_wire() {
            debug!(target: "slircbot::wire", "-> {}", line);
            self.outbox.push_back(line);
        }
    }
}

impl Commands for Sender {
    fn submit(&mut self, cmd: OutboundCommand) {
        if cmd.command == "quit" {
            let mut arguments = cmd.arguments.into_iter();
            self.submit_quit(QuitRequest {
                reason: arguments.next().filter(|r| !r.is_empty()),
                reconnect: None,
                priority: cmd.priority,
            });
            return;
        }

        if self.queueing && (is_destructive(&cmd.command) ^ cmd.priority) {
            self.hold(cmd);
        } else {
            self.emit(&cmd);
        }
    }

    fn submit_quit(&mut self, quit: QuitRequest) {
        if self.queueing && !quit.priority {
            // Only the first quit of a cycle counts
            self.quit.get_or_insert(quit);
        } else {
            let cmd = OutboundCommand::new("quit", quit.reason);
            self.emit(&cmd);
        }
    }
}
