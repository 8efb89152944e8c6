//! Channel membership tracking.
//!
//! The roster records who sits in which channel and with what status, as
//! far as the bot can see it: NAMES replies seed a channel, and joins,
//! parts, kicks, quits, nick changes and `+o/+h/+v` mode changes keep it
//! current. Channel and nick keys are stored trimmed and ASCII-lowercased.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Status flags of one channel member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    pub const REGULAR: Status = Status(0);
    pub const VOICE: Status = Status(1);
    pub const HALFOP: Status = Status(1 << 1);
    pub const OP: Status = Status(1 << 2);

    pub fn contains(self, other: Status) -> bool {
        self.0 & other.0 == other.0
    }

    fn insert(&mut self, other: Status) {
        self.0 |= other.0;
    }

    fn remove(&mut self, other: Status) {
        self.0 &= !other.0;
    }

    /// Status granted by a single mode letter.
    fn from_mode(letter: char) -> Option<Status> {
        match letter {
            'o' => Some(Status::OP),
            'h' => Some(Status::HALFOP),
            'v' => Some(Status::VOICE),
            _ => None,
        }
    }

    /// Strip leading NAMES prefixes (`@`, `%`, `+`) off a nick.
    fn from_names_entry(entry: &str) -> (Status, &str) {
        let mut status = Status::REGULAR;
        let mut rest = entry;
        for (prefix, flag) in [('@', Status::OP), ('%', Status::HALFOP), ('+', Status::VOICE)] {
            if let Some(stripped) = rest.strip_prefix(prefix) {
                status.insert(flag);
                rest = stripped;
            }
        }
        (status, rest)
    }
}

fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Shared channel membership table.
#[derive(Debug, Default)]
pub struct ChannelRoster {
    channels: RwLock<HashMap<String, HashMap<String, Status>>>,
}

impl ChannelRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a NAMES reply: `entries` is the space separated member list.
    pub fn names(&self, channel: &str, entries: &str) {
        let mut channels = self.channels.write();
        let members = channels.entry(key(channel)).or_default();
        for entry in entries.split_whitespace() {
            let (status, nick) = Status::from_names_entry(entry);
            if !nick.is_empty() {
                members.insert(key(nick), status);
            }
        }
    }

    pub fn join(&self, channel: &str, nick: &str) {
        self.channels
            .write()
            .entry(key(channel))
            .or_default()
            .insert(key(nick), Status::REGULAR);
    }

    /// Remove a member after a part or kick.
    pub fn part(&self, channel: &str, nick: &str) {
        if let Some(members) = self.channels.write().get_mut(&key(channel)) {
            members.remove(&key(nick));
        }
    }

    /// Drop a channel entirely, e.g. when the bot itself leaves it.
    pub fn forget(&self, channel: &str) {
        self.channels.write().remove(&key(channel));
    }

    /// Remove a nick from every channel.
    pub fn quit(&self, nick: &str) {
        let nick = key(nick);
        for members in self.channels.write().values_mut() {
            members.remove(&nick);
        }
    }

    /// Carry a member's status over to a new nick in every channel.
    pub fn rename(&self, old: &str, new: &str) {
        let (old, new) = (key(old), key(new));
        for members in self.channels.write().values_mut() {
            if let Some(status) = members.remove(&old) {
                members.insert(new.clone(), status);
            }
        }
    }

    /// Apply a channel mode change such as `+ov-v alice bob carol`.
    ///
    /// Only `o`, `h` and `v` are tracked; other letters are skipped without
    /// consuming a target. Targets the roster does not know are ignored.
    pub fn mode(&self, channel: &str, modes: &str, targets: &[String]) {
        let mut channels = self.channels.write();
        let Some(members) = channels.get_mut(&key(channel)) else {
            return;
        };

        let mut targets = targets.iter().flat_map(|t| t.split_whitespace());
        let mut adding = true;
        for letter in modes.trim().chars() {
            match letter {
                '+' => adding = true,
                '-' => adding = false,
                _ => {
                    let Some(flag) = Status::from_mode(letter.to_ascii_lowercase()) else {
                        continue;
                    };
                    let Some(nick) = targets.next() else {
                        return;
                    };
                    if let Some(status) = members.get_mut(&key(nick)) {
                        if adding {
                            status.insert(flag);
                        } else {
                            status.remove(flag);
                        }
                    }
                }
            }
        }
    }

    pub fn status(&self, nick: &str, channel: &str) -> Option<Status> {
        self.channels
            .read()
            .get(&key(channel))?
            .get(&key(nick))
            .copied()
    }

    pub fn is_in(&self, nick: &str, channel: &str) -> bool {
        self.status(nick, channel).is_some()
    }

    pub fn is_op(&self, nick: &str, channel: &str) -> bool {
        self.status(nick, channel).is_some_and(|s| s.contains(Status::OP))
    }

    pub fn is_halfop(&self, nick: &str, channel: &str) -> bool {
        self.status(nick, channel).is_some_and(|s| s.contains(Status::HALFOP))
    }

    pub fn is_voice(&self, nick: &str, channel: &str) -> bool {
        self.status(nick, channel).is_some_and(|s| s.contains(Status::VOICE))
    }

    /// Members of a channel, or `None` when the channel is unknown.
    pub fn users(&self, channel: &str) -> Option<Vec<String>> {
        let channels = self.channels.read();
        let mut users: Vec<String> = channels.get(&key(channel))?.keys().cloned().collect();
        users.sort();
        Some(users)
    }

    /// Channels in which `nick` is present, sorted.
    pub fn channels_of(&self, nick: &str) -> Vec<String> {
        let nick = key(nick);
        let mut out: Vec<String> = self
            .channels
            .read()
            .iter()
            .filter(|(_, members)| members.contains_key(&nick))
            .map(|(channel, _)| channel.clone())
            .collect();
        out.sort();
        out
    }

    pub fn clear(&self) {
        self.channels.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> ChannelRoster {
        let roster = ChannelRoster::new();
        roster.names("#Rust", "@Alice %bob +carol dave @+erin");
        roster
    }

    #[test]
    fn test_names_prefixes() {
        let roster = seeded();
        assert!(roster.is_op("alice", "#rust"));
        assert!(roster.is_halfop("BOB", "#RUST"));
        assert!(roster.is_voice("carol", "#rust"));
        assert!(!roster.is_op("dave", "#rust"));
        assert!(roster.is_in("dave", "#rust"));
        assert!(roster.is_op("erin", "#rust") && roster.is_voice("erin", "#rust"));
        assert_eq!(
            roster.users("#rust").unwrap(),
            ["alice", "bob", "carol", "dave", "erin"]
        );
        assert!(roster.users("#nowhere").is_none());
    }

    #[test]
    fn test_join_part_quit() {
        let roster = seeded();
        roster.join("#other", "dave");
        assert_eq!(roster.channels_of("Dave"), ["#other", "#rust"]);

        roster.part("#other", "dave");
        assert_eq!(roster.channels_of("dave"), ["#rust"]);

        roster.quit("dave");
        assert!(roster.channels_of("dave").is_empty());
        assert!(!roster.is_in("dave", "#rust"));
    }

    #[test]
    fn test_rename_keeps_status() {
        let roster = seeded();
        roster.rename("Alice", "alice_");
        assert!(!roster.is_in("alice", "#rust"));
        assert!(roster.is_op("alice_", "#rust"));
    }

    #[test]
    fn test_mode_changes() {
        let roster = seeded();
        roster.mode("#rust", "+oo-o", &["dave".into(), "carol alice".into()]);
        assert!(roster.is_op("dave", "#rust"));
        assert!(roster.is_op("carol", "#rust"));
        assert!(!roster.is_op("alice", "#rust"));

        // Untracked letters do not consume a target
        roster.mode("#rust", "+lv", &["carol".into()]);
        assert!(roster.is_voice("carol", "#rust"));

        // Removing a flag that is not set leaves it unset
        roster.mode("#rust", "-h", &["dave".into()]);
        assert!(!roster.is_halfop("dave", "#rust"));
        assert!(roster.is_op("dave", "#rust"));
    }

    #[test]
    fn test_forget_channel() {
        let roster = seeded();
        roster.forget("#RUST");
        assert!(roster.users("#rust").is_none());
    }
}
