//! # slirc-wire
//!
//! The client side of the IRC wire protocol, as used by the slircbot
//! runtime.
//!
//! ## Features
//!
//! - Line framing for tokio with a 512-byte read cap
//! - Classification of lines into numeric replies and named requests
//! - CTCP unwrapping into dedicated event types
//! - Per-type named argument lookup
//! - Outbound command serialization with control-byte filtering
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_wire::{parse_line, EventType, OutboundCommand};
//!
//! let event = parse_line(":bob!b@host PRIVMSG #room :\x01ACTION waves\x01", "bot");
//! assert_eq!(event.event_type(), Some(&EventType::Action));
//! assert_eq!(event.argument("action"), Some("waves"));
//!
//! let reply = OutboundCommand::new("privmsg", [event.source(), "hi bob"]);
//! assert_eq!(reply.to_wire().as_deref(), Some("PRIVMSG #room :hi bob"));
//! ```

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod command;
pub mod ctcp;
pub mod error;
pub mod event;
pub mod hostmask;
#[cfg(feature = "tokio")]
pub mod line;
pub mod parse;
pub mod response;

pub use self::command::OutboundCommand;
pub use self::ctcp::{Ctcp, CtcpKind};
pub use self::error::{ProtocolError, Result};
pub use self::event::{ArgRef, Event, EventType, RequestEvent, ResponseEvent};
pub use self::hostmask::Hostmask;
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, MAX_READ_LEN};
pub use self::parse::parse_line;
pub use self::response::Response;
