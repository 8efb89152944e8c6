//! Classified server messages.
//!
//! Every inbound line becomes one [`Event`]: a numeric [`ResponseEvent`] or
//! a named [`RequestEvent`]. Events are built fresh per line and shared
//! read-only with every plugin for one dispatch cycle.

use std::fmt;

use crate::hostmask::Hostmask;
use crate::response::Response;

/// Request event types.
///
/// Covers the command vocabulary of the protocol plus the types synthesized
/// from CTCP payloads. Command tokens outside the vocabulary are preserved
/// as [`EventType::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Nick,
    Whois,
    Quit,
    Join,
    Kick,
    Part,
    Mode,
    Topic,
    Privmsg,
    Notice,
    Pong,
    Names,
    Action,
    Raw,
    Ctcp,
    CtcpReply,
    PingReply,
    VersionReply,
    TimeReply,
    Ping,
    Oper,
    Invite,
    Error,
    Kill,
    /// CTCP VERSION query without arguments
    Version,
    /// CTCP TIME query without arguments
    Time,
    /// Any other command token, lowercased
    Other(String),
}

impl EventType {
    /// Map a type name to its variant (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "nick" => Self::Nick,
            "whois" => Self::Whois,
            "quit" => Self::Quit,
            "join" => Self::Join,
            "kick" => Self::Kick,
            "part" => Self::Part,
            "mode" => Self::Mode,
            "topic" => Self::Topic,
            "privmsg" => Self::Privmsg,
            "notice" => Self::Notice,
            "pong" => Self::Pong,
            "names" => Self::Names,
            "action" => Self::Action,
            "raw" => Self::Raw,
            "ctcp" => Self::Ctcp,
            "ctcpreply" => Self::CtcpReply,
            "pingreply" => Self::PingReply,
            "versionreply" => Self::VersionReply,
            "timereply" => Self::TimeReply,
            "ping" => Self::Ping,
            "oper" => Self::Oper,
            "invite" => Self::Invite,
            "error" => Self::Error,
            "kill" => Self::Kill,
            "version" => Self::Version,
            "time" => Self::Time,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Canonical type name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Nick => "nick",
            Self::Whois => "whois",
            Self::Quit => "quit",
            Self::Join => "join",
            Self::Kick => "kick",
            Self::Part => "part",
            Self::Mode => "mode",
            Self::Topic => "topic",
            Self::Privmsg => "privmsg",
            Self::Notice => "notice",
            Self::Pong => "pong",
            Self::Names => "names",
            Self::Action => "action",
            Self::Raw => "raw",
            Self::Ctcp => "ctcp",
            Self::CtcpReply => "ctcpReply",
            Self::PingReply => "pingReply",
            Self::VersionReply => "versionReply",
            Self::TimeReply => "timeReply",
            Self::Ping => "ping",
            Self::Oper => "oper",
            Self::Invite => "invite",
            Self::Error => "error",
            Self::Kill => "kill",
            Self::Version => "version",
            Self::Time => "time",
            Self::Other(s) => s,
        }
    }

    /// Position of a named argument for this type.
    ///
    /// Names are matched case-insensitively.
    pub fn alias_index(&self, name: &str) -> Option<usize> {
        let name = name.to_ascii_lowercase();
        let index = match (self, name.as_str()) {
            (Self::Quit, "message") => 0,
            (Self::Join, "channel") => 0,
            (Self::Kick, "channel") => 0,
            (Self::Kick, "user") => 1,
            (Self::Kick, "comment") => 2,
            (Self::Part, "channel") => 0,
            (Self::Part, "message") => 1,
            (Self::Mode, "target") => 0,
            (Self::Mode, "mode") => 1,
            (Self::Mode, "limit") => 2,
            (Self::Mode, "user") => 3,
            (Self::Mode, "banmask") => 4,
            (Self::Topic, "channel") => 0,
            (Self::Topic, "topic") => 1,
            (Self::Privmsg, "receiver") => 0,
            (Self::Privmsg, "text") => 1,
            (Self::Notice, "nickname") => 0,
            (Self::Notice, "text") => 1,
            (Self::Action, "target") => 0,
            (Self::Action, "action") => 1,
            (Self::Raw, "message") => 0,
            _ => return None,
        };
        Some(index)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument selector: a position or a per-type alias name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgRef<'a> {
    Index(usize),
    Name(&'a str),
}

impl From<usize> for ArgRef<'_> {
    fn from(index: usize) -> Self {
        ArgRef::Index(index)
    }
}

impl<'a> From<&'a str> for ArgRef<'a> {
    fn from(name: &'a str) -> Self {
        ArgRef::Name(name)
    }
}

/// Numeric server reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseEvent {
    /// Numeric code exactly as received, e.g. `"433"`.
    pub code: String,
    /// Named constant for the code, when known.
    pub response: Option<Response>,
    /// Parameters after the code; a `:`-led trailing parameter stays whole.
    pub description: Vec<String>,
    /// Everything after the code, unsplit.
    pub rest: String,
    /// Origin (the server name lands in `host`).
    pub origin: Hostmask,
    /// The line as received.
    pub raw_buffer: String,
}

impl ResponseEvent {
    /// Whether this reply carries the given numeric.
    pub fn is(&self, response: Response) -> bool {
        self.response == Some(response)
    }
}

/// Named command event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestEvent {
    pub kind: EventType,
    pub arguments: Vec<String>,
    /// Origin identity, empty unless the prefix was a full user mask.
    pub origin: Hostmask,
    /// The line as received.
    pub raw_buffer: String,
}

/// One classified inbound line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Response(ResponseEvent),
    Request(RequestEvent),
}

impl Event {
    /// Request type, `None` for numeric replies.
    pub fn event_type(&self) -> Option<&EventType> {
        match self {
            Event::Request(req) => Some(&req.kind),
            Event::Response(_) => None,
        }
    }

    pub fn as_request(&self) -> Option<&RequestEvent> {
        match self {
            Event::Request(req) => Some(req),
            Event::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&ResponseEvent> {
        match self {
            Event::Response(resp) => Some(resp),
            Event::Request(_) => None,
        }
    }

    /// Positional arguments (the description for numeric replies).
    pub fn arguments(&self) -> &[String] {
        match self {
            Event::Request(req) => &req.arguments,
            Event::Response(resp) => &resp.description,
        }
    }

    /// Look up an argument by position, or by alias name for request types
    /// that define one. Missing positions resolve to `None`.
    ///
    /// ```
    /// use slirc_wire::parse_line;
    ///
    /// let event = parse_line(":op!o@h KICK #chan victim :bye", "bot");
    /// assert_eq!(event.argument("user"), Some("victim"));
    /// assert_eq!(event.argument(1), Some("victim"));
    /// assert_eq!(event.argument(7), None);
    /// ```
    pub fn argument<'a>(&self, arg: impl Into<ArgRef<'a>>) -> Option<&str> {
        let index = match arg.into() {
            ArgRef::Index(index) => index,
            ArgRef::Name(name) => self.event_type()?.alias_index(name)?,
        };
        self.arguments().get(index).map(String::as_str)
    }

    pub fn origin(&self) -> &Hostmask {
        match self {
            Event::Request(req) => &req.origin,
            Event::Response(resp) => &resp.origin,
        }
    }

    pub fn nick(&self) -> &str {
        &self.origin().nick
    }

    pub fn username(&self) -> &str {
        &self.origin().user
    }

    pub fn host(&self) -> &str {
        &self.origin().host
    }

    /// `nick!username@host` of the origin.
    pub fn hostmask(&self) -> String {
        self.origin().to_string()
    }

    /// Where a reply should go: the channel when the first argument is a
    /// channel name, otherwise the sender's nick.
    pub fn source(&self) -> &str {
        match self.arguments().first() {
            Some(first) if first.starts_with('#') => first,
            _ => self.nick(),
        }
    }

    pub fn is_in_channel(&self) -> bool {
        self.source().starts_with('#')
    }

    pub fn is_from_user(&self) -> bool {
        self.origin().is_user()
    }

    pub fn is_from_server(&self) -> bool {
        !self.is_from_user()
    }

    pub fn raw_buffer(&self) -> &str {
        match self {
            Event::Request(req) => &req.raw_buffer,
            Event::Response(resp) => &resp.raw_buffer,
        }
    }
}
