//! Network module.
//!
//! Contains the connection lifecycle and the event dispatcher.

mod connection;
mod dispatch;

pub use connection::{
    CONNECT_TIMEOUT, Outcome, Session, SessionOptions, TICK_INTERVAL, connect, run_session,
};
pub use dispatch::{Dispatcher, type_hook};
