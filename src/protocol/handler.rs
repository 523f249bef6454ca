//! Incremental response parser
//!
//! A resumable state machine that consumes byte chunks of arbitrary
//! size and alignment and produces a decoded [`Reply`]. The underlying
//! transport is a byte stream, so a chunk may end mid-line, mid-CRLF,
//! or mid-body; the parser buffers whatever it is given and reports
//! how many more bytes it wants via [`ReplyParser::remaining`].
//!
//! A parser is tied to exactly one interaction: once it yields a reply
//! or fails, it accepts no further input. Mint a fresh one per
//! interaction from the operation's [`Request`](super::Request).

use bytes::{Bytes, BytesMut};

use crate::error::{check_error_line, BeanError, Result};
use super::response::{coerce_field, BodyKind, Expect, FieldValue, OpSpec, Reply};

/// Read-size hint reported while the header line is still incomplete.
/// Header lines have no declared length, so this is a guess, not a
/// bound; most are shorter than this.
const HEADER_READ_HINT: usize = 10;

/// Line terminator used throughout the protocol
pub const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, Copy)]
enum State {
    /// Accumulating bytes until a full CRLF-terminated header line
    AwaitingHeader,
    /// Header matched an entry declaring a body of `declared` bytes
    AwaitingBody { declared: usize },
    /// Reply produced; no further input accepted
    Done,
    /// Error raised; no further input accepted
    Failed,
}

/// Resumable parser for one request/response interaction
#[derive(Debug)]
pub struct ReplyParser {
    spec: &'static OpSpec,
    state: State,
    header: BytesMut,
    body: BytesMut,
    matched: Option<&'static Expect>,
    fields: Vec<(&'static str, FieldValue)>,
}

impl ReplyParser {
    /// Create a fresh parser for one interaction of the given operation.
    pub fn new(spec: &'static OpSpec) -> Self {
        Self {
            spec,
            state: State::AwaitingHeader,
            header: BytesMut::new(),
            body: BytesMut::new(),
            matched: None,
            fields: Vec::new(),
        }
    }

    /// How many more bytes the parser needs before it can make progress.
    ///
    /// Accurate once the header line has been parsed; while the header
    /// is still incomplete this is a small read-size hint. Callers may
    /// use it to size their next read, but the parser tolerates reads
    /// of any size, down to one byte at a time.
    pub fn remaining(&self) -> usize {
        match self.state {
            State::AwaitingHeader => HEADER_READ_HINT,
            State::AwaitingBody { declared } => (declared + CRLF.len()).saturating_sub(self.body.len()),
            State::Done | State::Failed => 0,
        }
    }

    /// Whether the parser has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, State::Done | State::Failed)
    }

    /// Feed the next chunk of received bytes.
    ///
    /// Returns `Ok(None)` when more input is needed, `Ok(Some(reply))`
    /// exactly once when the response is complete, and an error for
    /// server-reported error lines or malformed output. Feeding a
    /// terminal parser is an error.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<Reply>> {
        match self.advance(chunk) {
            Ok(done) => Ok(done),
            Err(e) => {
                self.state = State::Failed;
                Err(e)
            }
        }
    }

    fn advance(&mut self, chunk: &[u8]) -> Result<Option<Reply>> {
        match self.state {
            State::AwaitingHeader => {
                self.header.extend_from_slice(chunk);
                let Some(pos) = find_crlf(&self.header) else {
                    return Ok(None);
                };
                // Bytes past the terminator belong to the body phase.
                let mut line = self.header.split_to(pos + CRLF.len());
                line.truncate(pos);
                self.take_header_line(&line)
            }
            State::AwaitingBody { declared } => {
                self.body.extend_from_slice(chunk);
                self.try_finish_body(declared)
            }
            State::Done | State::Failed => Err(BeanError::UnexpectedResponse(
                "parser is one-shot and already terminal".to_string(),
            )),
        }
    }

    /// Parse a complete header line: error-word check, descriptor
    /// lookup, field-count check, field coercion.
    fn take_header_line(&mut self, line: &[u8]) -> Result<Option<Reply>> {
        let line = std::str::from_utf8(line).map_err(|_| {
            BeanError::UnexpectedResponse("header line is not valid UTF-8".to_string())
        })?;

        // Error words are global and checked before the operation's own
        // descriptor is consulted.
        check_error_line(line)?;

        let mut tokens = line.split(' ');
        let word = tokens.next().unwrap_or("");
        let values: Vec<&str> = tokens.collect();

        let Some(entry) = self.spec.lookup(word) else {
            return Err(BeanError::UnexpectedResponse(format!(
                "response was: {line}"
            )));
        };
        if values.len() != entry.fields.len() {
            return Err(BeanError::UnexpectedResponse(format!(
                "{} had wrong number of arguments: got {}, expected {}",
                word,
                values.len(),
                entry.fields.len()
            )));
        }

        self.matched = Some(entry);
        self.fields = entry
            .fields
            .iter()
            .zip(values)
            .map(|(name, value)| (*name, coerce_field(value)))
            .collect();

        if entry.body == BodyKind::None {
            self.state = State::Done;
            return Ok(Some(self.build_reply(None)?));
        }

        // Body-bearing entries declare their payload length in a field
        // literally named `bytes`.
        let declared = self
            .fields
            .iter()
            .find(|(name, _)| *name == "bytes")
            .and_then(|(_, v)| v.as_u64())
            .ok_or_else(|| {
                BeanError::UnexpectedResponse(format!("missing byte count in: {line}"))
            })?;

        // A hostile or broken server can declare a length that cannot
        // even be counted; reject it instead of overflowing.
        let declared = declared
            .checked_add(CRLF.len() as u64)
            .and_then(|wanted| usize::try_from(wanted).ok())
            .map(|wanted| wanted - CRLF.len())
            .ok_or_else(|| {
                BeanError::UnexpectedResponse(format!("unreasonable byte count in: {line}"))
            })?;

        // Whatever was over-read past the header terminator is the
        // start of the body.
        self.body = self.header.split();
        self.state = State::AwaitingBody { declared };
        self.try_finish_body(declared)
    }

    /// Complete the body phase once `declared + 2` bytes have arrived.
    fn try_finish_body(&mut self, declared: usize) -> Result<Option<Reply>> {
        let wanted = declared + CRLF.len();
        if self.body.len() < wanted {
            return Ok(None);
        }
        if self.body.len() != wanted || !self.body.ends_with(CRLF) {
            return Err(BeanError::ExpectedCrlf(
                "data not properly terminated by server".to_string(),
            ));
        }
        self.body.truncate(declared);
        let raw: Bytes = self.body.split().freeze();
        self.state = State::Done;
        Ok(Some(self.build_reply(Some(raw))?))
    }

    fn build_reply(&mut self, raw_body: Option<Bytes>) -> Result<Reply> {
        let entry = self.matched.ok_or_else(|| {
            BeanError::UnexpectedResponse("reply built before header parsed".to_string())
        })?;
        let body = match raw_body {
            Some(raw) => Some(entry.decode_body(raw)?),
            None => None,
        };
        Ok(Reply {
            outcome: entry.outcome,
            fields: std::mem::take(&mut self.fields),
            body,
        })
    }
}

/// Find the first CRLF in `buf`, tolerating a terminator that has not
/// fully arrived yet.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}
