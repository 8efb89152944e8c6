//! CTCP (Client-to-Client Protocol) message handling.
//!
//! CTCP requests ride inside PRIVMSG bodies and CTCP replies inside NOTICE
//! bodies, wrapped in `\x01` delimiters. Unwrapping is strict: a body counts
//! as CTCP only when it both starts and ends with the delimiter.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>
//!
//! # Example
//!
//! ```
//! use slirc_wire::ctcp::{Ctcp, CtcpKind};
//!
//! let ctcp = Ctcp::unwrap("\x01ACTION waves hello\x01").unwrap();
//! assert_eq!(ctcp.kind, CtcpKind::Action);
//! assert_eq!(ctcp.params, "waves hello");
//!
//! assert_eq!(Ctcp::wrap("action", "dances"), "\x01ACTION dances\x01");
//! ```

use std::fmt;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// CTCP sub-commands the event classifier cares about.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CtcpKind {
    /// ACTION - `/me` text.
    Action,
    /// VERSION - client version query or reply.
    Version,
    /// PING - latency handshake.
    Ping,
    /// TIME - local time query or reply.
    Time,
    /// Anything else, lowercased.
    Other(String),
}

impl CtcpKind {
    /// Classify a CTCP sub-command name (case-insensitive).
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "action" => Self::Action,
            "version" => Self::Version,
            "ping" => Self::Ping,
            "time" => Self::Time,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Lowercase name of the sub-command.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "action",
            Self::Version => "version",
            Self::Ping => "ping",
            Self::Time => "time",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for CtcpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unwrapped CTCP payload borrowed from a message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// Classified sub-command.
    pub kind: CtcpKind,
    /// Everything after the sub-command, trimmed (may be empty).
    pub params: &'a str,
    /// The whole interior of the delimiters, trimmed.
    pub payload: &'a str,
}

impl<'a> Ctcp<'a> {
    /// Unwrap a PRIVMSG/NOTICE body.
    ///
    /// Returns `None` unless the body starts and ends with `\x01`.
    ///
    /// ```
    /// use slirc_wire::ctcp::Ctcp;
    ///
    /// let ctcp = Ctcp::unwrap("\x01VERSION\x01").unwrap();
    /// assert_eq!(ctcp.kind.as_str(), "version");
    /// assert_eq!(ctcp.params, "");
    ///
    /// assert!(Ctcp::unwrap("\x01ACTION unterminated").is_none());
    /// ```
    pub fn unwrap(body: &'a str) -> Option<Self> {
        let interior = body.strip_prefix(CTCP_DELIM)?.strip_suffix(CTCP_DELIM)?;
        let payload = interior.trim();

        let (command, params) = payload.split_once(' ').unwrap_or((payload, ""));

        Some(Self {
            kind: CtcpKind::parse(command),
            params: params.trim(),
            payload,
        })
    }

    /// Build a delimited CTCP body: `\x01COMMAND params\x01`.
    ///
    /// The command is uppercased and the joined text is trimmed, so an empty
    /// `params` leaves no trailing space.
    pub fn wrap(command: &str, params: &str) -> String {
        let inner = format!("{} {}", command.to_ascii_uppercase(), params);
        format!("{CTCP_DELIM}{}{CTCP_DELIM}", inner.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_action() {
        let ctcp = Ctcp::unwrap("\x01ACTION waves hello\x01").unwrap();
        assert_eq!(ctcp.kind, CtcpKind::Action);
        assert_eq!(ctcp.params, "waves hello");
        assert_eq!(ctcp.payload, "ACTION waves hello");
    }

    #[test]
    fn test_unwrap_version_without_params() {
        let ctcp = Ctcp::unwrap("\x01VERSION\x01").unwrap();
        assert_eq!(ctcp.kind, CtcpKind::Version);
        assert_eq!(ctcp.params, "");
        assert_eq!(ctcp.payload, "VERSION");
    }

    #[test]
    fn test_unwrap_trims_payload() {
        let ctcp = Ctcp::unwrap("\x01 PING 12345 \x01").unwrap();
        assert_eq!(ctcp.kind, CtcpKind::Ping);
        assert_eq!(ctcp.params, "12345");
        assert_eq!(ctcp.payload, "PING 12345");
    }

    #[test]
    fn test_unwrap_other_is_lowercased() {
        let ctcp = Ctcp::unwrap("\x01FINGER\x01").unwrap();
        assert_eq!(ctcp.kind, CtcpKind::Other("finger".to_owned()));
    }

    #[test]
    fn test_unwrap_requires_both_delimiters() {
        assert!(Ctcp::unwrap("\x01ACTION waves").is_none());
        assert!(Ctcp::unwrap("ACTION waves\x01").is_none());
        assert!(Ctcp::unwrap("hello world").is_none());
        assert!(Ctcp::unwrap("").is_none());
        assert!(Ctcp::unwrap("\x01").is_none());
    }

    #[test]
    fn test_wrap() {
        assert_eq!(Ctcp::wrap("action", "dances"), "\x01ACTION dances\x01");
        assert_eq!(Ctcp::wrap("version", ""), "\x01VERSION\x01");
        assert_eq!(Ctcp::wrap("ping", "123 "), "\x01PING 123\x01");
    }
}
