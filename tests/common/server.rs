//! The server end of a test session.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::io::DuplexStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::codec::Framed;

use slircbot::network::{Dispatcher, Outcome, Session, SessionOptions};
use slircbot::wire::LineCodec;

/// Plays the IRC server against one running session.
pub struct TestServer {
    framed: Framed<DuplexStream, LineCodec>,
    session: JoinHandle<Outcome>,
}

impl TestServer {
    /// Spawn the session on one end of a pipe and keep the other.
    pub fn spawn(dispatcher: Dispatcher, options: SessionOptions) -> Self {
        let (bot_side, server_side) = tokio::io::duplex(64 * 1024);
        let session = tokio::spawn(Session::new(bot_side, dispatcher, options).run());
        Self {
            framed: Framed::new(server_side, LineCodec::new()),
            session,
        }
    }

    /// Send a raw line to the bot.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.framed.send(line.to_owned()).await?;
        Ok(())
    }

    /// Receive one line from the bot.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive one line, failing after `dur`.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        match timeout(dur, self.framed.next()).await? {
            Some(line) => Ok(line?),
            None => anyhow::bail!("bot closed the connection"),
        }
    }

    /// Receive lines until `predicate` matches one, inclusive.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Collect everything the bot writes until it closes the connection.
    pub async fn recv_all(&mut self) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            match timeout(Duration::from_secs(5), self.framed.next()).await? {
                Some(line) => lines.push(line?),
                None => return Ok(lines),
            }
        }
    }

    /// Read the registration burst, which ends with NICK (or MODE when
    /// invisible).
    pub async fn expect_registration(&mut self) -> anyhow::Result<Vec<String>> {
        self.recv_until(|line| line.starts_with("NICK")).await
    }

    /// Whether nothing arrives within `dur`.
    pub async fn is_quiet(&mut self, dur: Duration) -> bool {
        timeout(dur, self.framed.next()).await.is_err()
    }

    /// Close the server end, as a dropped connection would.
    pub async fn hang_up(mut self) -> anyhow::Result<Outcome> {
        self.framed.close().await?;
        drop(self.framed);
        Ok(timeout(Duration::from_secs(5), self.session).await??)
    }

    /// Wait for the session to end on its own.
    pub async fn outcome(self) -> anyhow::Result<Outcome> {
        let Self { framed, session } = self;
        let outcome = timeout(Duration::from_secs(5), session).await??;
        drop(framed);
        Ok(outcome)
    }
}
