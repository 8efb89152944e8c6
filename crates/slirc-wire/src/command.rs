//! Outbound command serialization.
//!
//! A command is serialized as its uppercased name followed by its
//! space-joined arguments, with the last argument always given a leading
//! `:` so it may contain spaces. The `raw` pseudo-command sends its joined
//! arguments verbatim. Control bytes other than `\x01` (which CTCP needs)
//! are removed before anything reaches the socket.

/// A command a plugin asked to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundCommand {
    /// Lowercased command name, or `raw`.
    pub command: String,
    pub arguments: Vec<String>,
    /// Inverts the queueing rule for this command (see the sender).
    pub priority: bool,
}

impl OutboundCommand {
    pub fn new<I, S>(command: &str, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.to_ascii_lowercase(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            priority: false,
        }
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// Serialize to a wire line without the CRLF terminator.
    ///
    /// Returns `None` when the result would be empty after stripping
    /// control characters.
    ///
    /// ```
    /// use slirc_wire::OutboundCommand;
    ///
    /// let cmd = OutboundCommand::new("privmsg", ["#room", "hello world"]);
    /// assert_eq!(cmd.to_wire().as_deref(), Some("PRIVMSG #room :hello world"));
    ///
    /// let raw = OutboundCommand::new("raw", ["CAP LS 302"]);
    /// assert_eq!(raw.to_wire().as_deref(), Some("CAP LS 302"));
    /// ```
    pub fn to_wire(&self) -> Option<String> {
        let line = if self.command == "raw" {
            self.arguments.join(" ")
        } else {
            let mut line = self.command.to_ascii_uppercase();
            if let Some((last, middle)) = self.arguments.split_last() {
                for arg in middle {
                    line.push(' ');
                    line.push_str(arg);
                }
                line.push_str(" :");
                line.push_str(last);
            }
            line
        };

        let line = strip_control(&line);
        (!line.is_empty()).then_some(line)
    }
}

/// Remove NUL and `\x02`..=`\x1F` (colours, bold, CR, LF and friends).
///
/// `\x01` survives so CTCP bodies stay intact.
///
/// ```
/// use slirc_wire::command::strip_control;
///
/// assert_eq!(strip_control("PRIVMSG #a :\x02bold\x02\r\nQUIT"), "PRIVMSG #a :boldQUIT");
/// assert_eq!(strip_control("\x01ACTION x\x01"), "\x01ACTION x\x01");
/// ```
pub fn strip_control(line: &str) -> String {
    line.chars()
        .filter(|&c| !matches!(c, '\x00' | '\x02'..='\x1f'))
        .collect()
}
