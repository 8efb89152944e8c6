//! Connection lifecycle.
//!
//! One [`Session`] is one connection to the server:
//!
//! ```text
//! connect ──▶ register (PASS/USER/NICK/MODE) ──▶ on_connect
//!                                                   │
//!        ┌──────────────────────────────────────────┘
//!        ▼
//!   begin cycle ──▶ wait for line ──(tick)──▶ on_tick on every plugin
//!        ▲               │ line
//!        │               ▼
//!        │         parse ▶ dispatch ▶ flush
//!        │               │
//!        └───── no quit ─┤
//!                        ▼ quit held
//!              on_shutdown ▶ QUIT ▶ Outcome
//! ```
//!
//! The loop is strictly sequential: line N is parsed, dispatched and
//! flushed before line N+1 is read. Idle time is measured from the last
//! received line; when it exceeds the configured timeout, or the server
//! closes the stream, every plugin's shutdown hook runs and the session
//! ends with its base outcome.

use futures_util::{SinkExt, StreamExt};
use slirc_wire::{LineCodec, parse_line};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{Instrument, debug, error, info, warn};

use super::dispatch::Dispatcher;
use crate::config::Config;
use crate::error::SessionError;
use crate::sender::{Commands, QuitRequest, Sender};
use crate::telemetry::spans;

/// Bound on establishing the TCP connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while no data arrives.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// How a session ended, and what the supervisor should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Reconnect right away (requested through a quit).
    Reconnect,
    /// The connection was lost and keepalive is on: retry after a pause.
    Keepalive,
    /// Stop.
    End,
}

/// Timing knobs of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Silence after which the connection counts as dead.
    pub idle_timeout: Option<Duration>,
    pub tick_interval: Duration,
    /// Outcome when the session ends without an explicit quit.
    pub base_outcome: Outcome,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            idle_timeout: config.idle_timeout(),
            tick_interval: TICK_INTERVAL,
            base_outcome: if config.keepalive {
                Outcome::Keepalive
            } else {
                Outcome::End
            },
        }
    }
}

/// Result of waiting for the next line.
enum Wait {
    Line(String),
    Tick,
    TimedOut,
    Closed,
}

/// Open the TCP connection to the configured server.
pub async fn connect(config: &Config) -> Result<TcpStream, SessionError> {
    let (server, port) = (config.server.clone(), config.port);
    match tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((server.as_str(), port))).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(SessionError::Connect {
            server,
            port,
            source,
        }),
        Err(_) => Err(SessionError::ConnectTimeout {
            server,
            port,
            timeout: CONNECT_TIMEOUT,
        }),
    }
}

/// Connect to the configured server and run one full session.
///
/// A failed connect is logged and reported as [`Outcome::End`].
pub async fn run_session(dispatcher: Dispatcher) -> Outcome {
    let config = dispatcher.services().config.get();
    let span = spans::session(&config.server, config.port);

    async move {
        let stream = match connect(&config).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, code = e.error_code(), "connection failed");
                return Outcome::End;
            }
        };
        info!("connected");

        let options = SessionOptions::from_config(&config);
        Session::new(stream, dispatcher, options).run().await
    }
    .instrument(span)
    .await
}

/// One connection to the server.
pub struct Session<S> {
    framed: Framed<S, LineCodec>,
    dispatcher: Dispatcher,
    sender: Sender,
    options: SessionOptions,
    last_line: Instant,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, dispatcher: Dispatcher, options: SessionOptions) -> Self {
        Self {
            framed: Framed::new(stream, LineCodec::new()),
            dispatcher,
            sender: Sender::new(),
            options,
            last_line: Instant::now(),
        }
    }

    /// Register with the server and dispatch until the session ends.
    pub async fn run(mut self) -> Outcome {
        self.register();
        self.dispatcher.connect(&mut self.sender);
        self.write_out().await;

        let outcome = self.event_loop().await;
        if let Err(e) = self.framed.close().await {
            debug!(error = %e, "close failed");
        }
        info!(?outcome, "session ended");
        outcome
    }

    fn register(&mut self) {
        let config = self.dispatcher.services().config.get();
        if let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) {
            self.sender.send("pass", [password]);
        }
        self.sender.send(
            "user",
            [
                config.username.as_str(),
                config.server.as_str(),
                config.server.as_str(),
                config.realname.as_str(),
            ],
        );
        self.sender.nick(&config.nick);
        if config.invisible {
            self.sender.mode(&config.nick, Some("+i"));
        }
    }

    async fn event_loop(&mut self) -> Outcome {
        loop {
            self.sender.begin_cycle();

            let line = loop {
                match self.next_line().await {
                    Wait::Line(line) => break line,
                    Wait::Tick => {
                        self.dispatcher.tick(&mut self.sender);
                        self.write_out().await;
                    }
                    Wait::TimedOut => {
                        warn!("timed out");
                        return self.shutdown().await;
                    }
                    Wait::Closed => {
                        info!("connection closed by server");
                        return self.shutdown().await;
                    }
                }
            };

            debug!(target: "slircbot::wire", "<- {}", line);
            let nick = self.dispatcher.services().config.get().nick.clone();
            let event = parse_line(&line, &nick);

            let kind = match event.event_type() {
                Some(kind) => kind.as_str().to_owned(),
                None => event.as_response().map(|r| r.code.clone()).unwrap_or_default(),
            };
            {
                let _span = spans::dispatch(&kind).entered();
                self.dispatcher.dispatch(&event, &mut self.sender);
            }

            let quit = self.sender.flush();
            self.write_out().await;

            if let Some(quit) = quit {
                return self.quit(quit).await;
            }
        }
    }

    async fn next_line(&mut self) -> Wait {
        let wait = match tokio::time::timeout(self.options.tick_interval, self.framed.next()).await
        {
            Ok(Some(Ok(line))) => {
                self.last_line = Instant::now();
                return Wait::Line(line);
            }
            Ok(Some(Err(e))) => {
                warn!(error = %e, "read error");
                Wait::Closed
            }
            Ok(None) => Wait::Closed,
            Err(_) => Wait::Tick,
        };

        match self.options.idle_timeout {
            Some(limit) if matches!(wait, Wait::Tick) && self.last_line.elapsed() >= limit => {
                Wait::TimedOut
            }
            _ => wait,
        }
    }

    /// Shutdown hooks, then the base outcome.
    async fn shutdown(&mut self) -> Outcome {
        self.sender.flush();
        self.dispatcher.shutdown(&mut self.sender);
        self.write_out().await;
        self.options.base_outcome
    }

    /// Shutdown hooks, then the held quit itself.
    async fn quit(&mut self, quit: QuitRequest) -> Outcome {
        let outcome = match quit.reconnect {
            Some(true) => Outcome::Reconnect,
            Some(false) => Outcome::End,
            None => self.options.base_outcome,
        };
        info!(reason = ?quit.reason, ?outcome, "quitting");

        self.dispatcher.shutdown(&mut self.sender);
        self.sender.submit_quit(QuitRequest {
            priority: true,
            ..quit
        });
        self.write_out().await;
        outcome
    }

    /// Write everything the sender has serialized.
    ///
    /// Write errors are only logged; the next read notices the dead socket.
    async fn write_out(&mut self) {
        if !self.sender.has_output() {
            return;
        }
        let lines: Vec<String> = self.sender.drain().collect();
        if let Err(e) = self.send_lines(lines).await {
            warn!(error = %e, "write failed");
        }
    }

    async fn send_lines(&mut self, lines: Vec<String>) -> Result<(), SessionError> {
        for line in lines {
            self.framed.feed(line).await?;
        }
        self.framed.flush().await?;
        Ok(())
    }
}
