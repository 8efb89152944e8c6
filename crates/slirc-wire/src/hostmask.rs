//! Message origin identity.
//!
//! A prefix is either a user's `nick!user@host` mask or a bare server name.
//! Only a complete user mask populates the nick and username; anything else
//! is kept whole as the host.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use std::fmt;

/// Origin identity of a message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hostmask {
    /// Nickname (empty for server-originated messages)
    pub nick: String,
    /// Username / ident (empty for server-originated messages)
    pub user: String,
    /// Hostname, or the whole prefix when it is not a user mask
    pub host: String,
}

impl Hostmask {
    /// Create a user hostmask from its components.
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: user.into(),
            host: host.into(),
        }
    }

    /// Parse a prefix (without its leading `:`).
    ///
    /// A user mask needs a non-empty nick free of `!`/`@`, a `!`, a
    /// non-empty username free of `@`, then `@` and the host. Anything that
    /// does not fit is treated as a server hostname.
    ///
    /// # Example
    ///
    /// ```
    /// use slirc_wire::Hostmask;
    ///
    /// let mask = Hostmask::parse("bob!b@host.com");
    /// assert_eq!(mask.nick, "bob");
    /// assert_eq!(mask.user, "b");
    /// assert_eq!(mask.host, "host.com");
    ///
    /// let server = Hostmask::parse("irc.example.net");
    /// assert!(server.nick.is_empty());
    /// assert_eq!(server.host, "irc.example.net");
    /// ```
    pub fn parse(prefix: &str) -> Self {
        Self::parse_user(prefix).unwrap_or_else(|| Self {
            host: prefix.to_owned(),
            ..Self::default()
        })
    }

    fn parse_user(prefix: &str) -> Option<Self> {
        let bang = prefix.find(['!', '@'])?;
        if bang == 0 || prefix.as_bytes()[bang] != b'!' {
            return None;
        }
        let nick = &prefix[..bang];
        let rest = &prefix[bang + 1..];

        let at = rest.find('@')?;
        if at == 0 {
            return None;
        }

        Some(Self::new(nick, &rest[..at], &rest[at + 1..]))
    }

    /// Whether this identity belongs to a user rather than a server.
    #[inline]
    pub fn is_user(&self) -> bool {
        !self.user.is_empty()
    }
}

impl fmt::Display for Hostmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nick, self.user, self.host)
    }
}

impl From<&str> for Hostmask {
    fn from(s: &str) -> Self {
        Hostmask::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_mask() {
        let mask = Hostmask::parse("nick!user@host.example.com");
        assert_eq!(mask, Hostmask::new("nick", "user", "host.example.com"));
        assert!(mask.is_user());
    }

    #[test]
    fn test_parse_server_name() {
        let mask = Hostmask::parse("irc.libera.chat");
        assert_eq!(mask.nick, "");
        assert_eq!(mask.user, "");
        assert_eq!(mask.host, "irc.libera.chat");
        assert!(!mask.is_user());
    }

    #[test]
    fn test_parse_incomplete_masks_fall_back_to_host() {
        for prefix in ["nick@host", "nick!user", "!user@host", "nick!@host", "@host"] {
            let mask = Hostmask::parse(prefix);
            assert_eq!(mask.host, prefix, "prefix {prefix:?}");
            assert!(mask.nick.is_empty());
        }
    }

    #[test]
    fn test_host_may_contain_at() {
        let mask = Hostmask::parse("n!u@weird@host");
        assert_eq!(mask.user, "u");
        assert_eq!(mask.host, "weird@host");
    }

    #[test]
    fn test_empty_host_allowed() {
        let mask = Hostmask::parse("n!u@");
        assert_eq!(mask, Hostmask::new("n", "u", ""));
    }

    #[test]
    fn test_display() {
        assert_eq!(Hostmask::new("a", "b", "c").to_string(), "a!b@c");
        assert_eq!(Hostmask::parse("irc.example.net").to_string(), "!@irc.example.net");
    }
}
