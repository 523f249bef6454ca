//! Protocol Module
//!
//! Encoders, response descriptors, and the incremental parser for the
//! beanstalkd wire protocol.
//!
//! ## Wire Format
//!
//! Every command is one ASCII line of space-separated tokens terminated
//! by CRLF; `put` appends the raw payload and another CRLF:
//!
//! ```text
//! put <pri> <delay> <ttr> <bytes>\r\n
//! <payload>\r\n
//! ```
//!
//! Every response is a header line (status word plus positional
//! fields), optionally followed by a body whose length the header
//! declares:
//!
//! ```text
//! RESERVED <jid> <bytes>\r\n
//! <payload>\r\n
//! ```
//!
//! Job payload bodies are opaque bytes; stats and list bodies are YAML.
//!
//! ## Usage
//!
//! An operation function returns a [`Request`]; the caller writes
//! `request.line()` to its transport, then feeds received chunks into
//! `request.parser()` until it yields a [`Reply`]:
//!
//! ```no_run
//! use beanqueue::protocol;
//!
//! # fn read_chunk(hint: usize) -> Vec<u8> { unimplemented!() }
//! # fn main() -> beanqueue::Result<()> {
//! let req = protocol::reserve();
//! // send req.line() ...
//! let mut parser = req.parser();
//! let reply = loop {
//!     let chunk = read_chunk(parser.remaining());
//!     if let Some(reply) = parser.feed(&chunk)? {
//!         break reply;
//!     }
//! };
//! println!("reserved job {:?}", reply.jid());
//! # Ok(())
//! # }
//! ```
//!
//! Replies are matched to requests in strict FIFO order within one
//! connection; the transport must fully drain one reply before sending
//! the next line. See [`crate::client::Connection`] for a transport
//! that upholds this.

pub mod command;
pub mod handler;
pub mod response;

pub use command::{
    bury, check_tube_name, delete, ignore, kick, list_tube_used, list_tubes, list_tubes_watched,
    peek, peek_buried, peek_delayed, peek_ready, put, release, reserve, reserve_with_timeout,
    stats, stats_job, stats_tube, touch, use_tube, watch, Request, DEFAULT_MAX_JOB_SIZE,
    MAX_TUBE_NAME_LEN,
};
pub use handler::{ReplyParser, CRLF};
pub use response::{Body, BodyKind, Expect, FieldValue, OpSpec, Outcome, Reply};
