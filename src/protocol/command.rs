//! Command encoding and the operation façade
//!
//! One function per protocol operation. Each returns a [`Request`]
//! pairing the exact wire line with the operation's response
//! descriptor; the caller writes the line to its transport and drives
//! a parser minted from the same request. Nothing here performs I/O.
//!
//! Validation (tube-name grammar, put size limit) happens before any
//! line is constructed, so a bad argument never produces wire bytes.

use crate::error::{BeanError, Result};
use super::handler::{ReplyParser, CRLF};
use super::response::{self, OpSpec};

/// Default server-side job size limit, in bytes. The server advertises
/// the real value under the `max-job-size` stats key.
pub const DEFAULT_MAX_JOB_SIZE: usize = (1 << 16) - 1;

/// Longest legal tube name, in bytes
pub const MAX_TUBE_NAME_LEN: usize = 200;

/// One encoded operation: the line to send and the descriptor to parse
/// the answer with.
#[derive(Debug, Clone)]
pub struct Request {
    line: Vec<u8>,
    spec: &'static OpSpec,
}

impl Request {
    fn new(line: impl Into<Vec<u8>>, spec: &'static OpSpec) -> Self {
        Self { line: line.into(), spec }
    }

    /// The exact bytes to write to the server
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    /// The operation's response descriptor
    pub fn spec(&self) -> &'static OpSpec {
        self.spec
    }

    /// Operation name (e.g. "reserve")
    pub fn op_name(&self) -> &'static str {
        self.spec.name
    }

    /// Mint a fresh one-shot parser for this operation.
    ///
    /// Cheap, and callable any number of times: a caller issuing the
    /// same request on several connections needs one parser each.
    pub fn parser(&self) -> ReplyParser {
        ReplyParser::new(self.spec)
    }

    /// Consume the request, yielding the wire line
    pub fn into_line(self) -> Vec<u8> {
        self.line
    }
}

/// Validate a tube name against the protocol's naming grammar:
/// alphanumerics plus `+()/;.$_-`, 1–200 bytes, must not start with `-`.
pub fn check_tube_name(name: &str) -> Result<()> {
    fn legal(c: u8) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, b'+' | b'(' | b')' | b'/' | b';' | b'.' | b'$' | b'_' | b'-')
    }

    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_TUBE_NAME_LEN {
        return Err(BeanError::BadFormat(format!(
            "illegal tube name: {:?} (must be 1-{} characters)",
            name, MAX_TUBE_NAME_LEN
        )));
    }
    if bytes[0] == b'-' || !bytes.iter().copied().all(legal) {
        return Err(BeanError::BadFormat(format!("illegal tube name: {name:?}")));
    }
    Ok(())
}

// =============================================================================
// Producer operations
// =============================================================================

/// Enqueue a job on the currently used tube.
///
/// `max_job_size` is owned by the caller; payloads at or above it fail
/// with [`BeanError::JobTooBig`] before any bytes are produced.
pub fn put(payload: &[u8], pri: u32, delay: u32, ttr: u32, max_job_size: usize) -> Result<Request> {
    if payload.len() >= max_job_size {
        return Err(BeanError::JobTooBig(format!(
            "job size is {} (max allowed is {})",
            payload.len(),
            max_job_size
        )));
    }
    let mut line = format!("put {pri} {delay} {ttr} {}\r\n", payload.len()).into_bytes();
    line.extend_from_slice(payload);
    line.extend_from_slice(CRLF);
    Ok(Request::new(line, &response::PUT))
}

/// Select the tube subsequent puts go to.
pub fn use_tube(tube: &str) -> Result<Request> {
    check_tube_name(tube)?;
    Ok(Request::new(format!("use {tube}\r\n"), &response::USE))
}

// =============================================================================
// Consumer operations
// =============================================================================

/// Claim the next ready job from the watched tubes, blocking on the
/// server until one exists.
pub fn reserve() -> Request {
    Request::new(&b"reserve\r\n"[..], &response::RESERVE)
}

/// Like [`reserve`], but the server answers `TIMED_OUT` after `timeout`
/// seconds with nothing to hand out.
pub fn reserve_with_timeout(timeout: u32) -> Request {
    Request::new(
        format!("reserve-with-timeout {timeout}\r\n"),
        &response::RESERVE_WITH_TIMEOUT,
    )
}

/// Remove a job from the server entirely.
pub fn delete(jid: u64) -> Request {
    Request::new(format!("delete {jid}\r\n"), &response::DELETE)
}

/// Put a reserved job back in the ready (or delayed) queue.
pub fn release(jid: u64, pri: u32, delay: u32) -> Request {
    Request::new(format!("release {jid} {pri} {delay}\r\n"), &response::RELEASE)
}

/// Move a reserved job to the buried state.
pub fn bury(jid: u64, pri: u32) -> Request {
    Request::new(format!("bury {jid} {pri}\r\n"), &response::BURY)
}

/// Request more time to finish a reserved job.
pub fn touch(jid: u64) -> Request {
    Request::new(format!("touch {jid}\r\n"), &response::TOUCH)
}

/// Add a tube to the watch list.
pub fn watch(tube: &str) -> Result<Request> {
    check_tube_name(tube)?;
    Ok(Request::new(format!("watch {tube}\r\n"), &response::WATCH))
}

/// Remove a tube from the watch list.
pub fn ignore(tube: &str) -> Result<Request> {
    check_tube_name(tube)?;
    Ok(Request::new(format!("ignore {tube}\r\n"), &response::IGNORE))
}

// =============================================================================
// Inspection operations
// =============================================================================

/// Inspect a job without reserving it. With no id, peeks the next
/// buried job (the historical bare `peek` form).
pub fn peek(jid: Option<u64>) -> Request {
    let line = match jid {
        Some(jid) => format!("peek {jid}\r\n"),
        None => "peek\r\n".to_string(),
    };
    Request::new(line, &response::PEEK)
}

/// Peek the next ready job on the used tube.
pub fn peek_ready() -> Request {
    Request::new(&b"peek-ready\r\n"[..], &response::PEEK_READY)
}

/// Peek the delayed job closest to becoming ready on the used tube.
pub fn peek_delayed() -> Request {
    Request::new(&b"peek-delayed\r\n"[..], &response::PEEK_DELAYED)
}

/// Peek the next buried job on the used tube.
pub fn peek_buried() -> Request {
    Request::new(&b"peek-buried\r\n"[..], &response::PEEK_BURIED)
}

/// Move up to `bound` buried (or delayed) jobs back to ready.
pub fn kick(bound: u32) -> Request {
    Request::new(format!("kick {bound}\r\n"), &response::KICK)
}

/// Server-wide statistics, as a YAML map.
pub fn stats() -> Request {
    Request::new(&b"stats\r\n"[..], &response::STATS)
}

/// Statistics for one job.
pub fn stats_job(jid: u64) -> Request {
    Request::new(format!("stats-job {jid}\r\n"), &response::STATS_JOB)
}

/// Statistics for one tube.
pub fn stats_tube(tube: &str) -> Result<Request> {
    check_tube_name(tube)?;
    Ok(Request::new(format!("stats-tube {tube}\r\n"), &response::STATS_TUBE))
}

/// All tubes known to the server, as a YAML list.
pub fn list_tubes() -> Request {
    Request::new(&b"list-tubes\r\n"[..], &response::LIST_TUBES)
}

/// The tube puts currently go to.
pub fn list_tube_used() -> Request {
    Request::new(&b"list-tube-used\r\n"[..], &response::LIST_TUBE_USED)
}

/// The tubes currently watched, as a YAML list.
pub fn list_tubes_watched() -> Request {
    Request::new(&b"list-tubes-watched\r\n"[..], &response::LIST_TUBES_WATCHED)
}
