//! Blocking Connection
//!
//! A single-threaded, serialized beanstalkd connection: one interaction
//! at a time, write the command line then fully drain one reply before
//! the next command. The protocol has no request identifiers, so this
//! FIFO discipline is what keeps replies attributed to the right
//! requests; `transact` taking `&mut self` enforces it.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::config::Config;
use crate::error::{BeanError, Result};
use crate::job::Job;
use crate::protocol::{self, Reply, ReplyParser, Request};

/// A blocking TCP connection to one beanstalkd server
pub struct Connection {
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: String,

    /// Local put size limit. Starts at the config value and changes
    /// only through [`set_max_job_size`](Self::set_max_job_size) or
    /// [`refresh_max_job_size`](Self::refresh_max_job_size), never as a
    /// side effect of other calls.
    max_job_size: usize,
}

impl Connection {
    /// Connect to the server named by the config.
    pub fn connect(config: &Config) -> Result<Self> {
        let stream = TcpStream::connect(&config.server_addr)?;

        // Disable Nagle's algorithm; interactions are small and latency-bound
        stream.set_nodelay(true)?;
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        tracing::debug!("Connected to beanstalkd at {}", peer_addr);

        Ok(Self {
            stream,
            peer_addr,
            max_job_size: config.max_job_size,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Current local put size limit
    pub fn max_job_size(&self) -> usize {
        self.max_job_size
    }

    /// Override the local put size limit
    pub fn set_max_job_size(&mut self, bytes: usize) {
        self.max_job_size = bytes;
    }

    /// Run one complete interaction: send the request line, then read
    /// and parse exactly one reply.
    pub fn transact(&mut self, request: Request) -> Result<Reply> {
        tracing::trace!("Sending {} to {}", request.op_name(), self.peer_addr);
        self.stream.write_all(request.line())?;
        let mut parser = request.parser();
        read_reply(&mut self.stream, &mut parser)
    }

    // -------------------------------------------------------------------------
    // Producer operations
    // -------------------------------------------------------------------------

    /// Enqueue a job on the currently used tube
    pub fn put(&mut self, payload: &[u8], pri: u32, delay: u32, ttr: u32) -> Result<Reply> {
        self.transact(protocol::put(payload, pri, delay, ttr, self.max_job_size)?)
    }

    /// Select the tube subsequent puts go to
    pub fn use_tube(&mut self, tube: &str) -> Result<Reply> {
        self.transact(protocol::use_tube(tube)?)
    }

    // -------------------------------------------------------------------------
    // Consumer operations
    // -------------------------------------------------------------------------

    /// Claim the next ready job, blocking until one exists
    pub fn reserve(&mut self) -> Result<Reply> {
        self.transact(protocol::reserve())
    }

    /// Claim the next ready job, waiting at most `timeout` seconds.
    /// A `TIMED_OUT` answer comes back as a reply, not an error.
    pub fn reserve_with_timeout(&mut self, timeout: u32) -> Result<Reply> {
        self.transact(protocol::reserve_with_timeout(timeout))
    }

    /// Claim the next ready job and wrap it as a [`Job`]
    pub fn reserve_job(&mut self) -> Result<Job> {
        let reply = self.reserve()?;
        Job::from_reply(&reply, true)
    }

    /// Remove a job from the server
    pub fn delete(&mut self, jid: u64) -> Result<Reply> {
        self.transact(protocol::delete(jid))
    }

    /// Put a reserved job back in the ready (or delayed) queue
    pub fn release(&mut self, jid: u64, pri: u32, delay: u32) -> Result<Reply> {
        self.transact(protocol::release(jid, pri, delay))
    }

    /// Move a reserved job to the buried state
    pub fn bury(&mut self, jid: u64, pri: u32) -> Result<Reply> {
        self.transact(protocol::bury(jid, pri))
    }

    /// Request more time to finish a reserved job
    pub fn touch(&mut self, jid: u64) -> Result<Reply> {
        self.transact(protocol::touch(jid))
    }

    /// Add a tube to the watch list
    pub fn watch(&mut self, tube: &str) -> Result<Reply> {
        self.transact(protocol::watch(tube)?)
    }

    /// Remove a tube from the watch list
    pub fn ignore(&mut self, tube: &str) -> Result<Reply> {
        self.transact(protocol::ignore(tube)?)
    }

    // -------------------------------------------------------------------------
    // Inspection operations
    // -------------------------------------------------------------------------

    /// Inspect a job without reserving it; `None` peeks the next buried job
    pub fn peek(&mut self, jid: Option<u64>) -> Result<Reply> {
        self.transact(protocol::peek(jid))
    }

    /// Peek the next ready job on the used tube
    pub fn peek_ready(&mut self) -> Result<Reply> {
        self.transact(protocol::peek_ready())
    }

    /// Peek the delayed job closest to becoming ready on the used tube
    pub fn peek_delayed(&mut self) -> Result<Reply> {
        self.transact(protocol::peek_delayed())
    }

    /// Peek the next buried job on the used tube
    pub fn peek_buried(&mut self) -> Result<Reply> {
        self.transact(protocol::peek_buried())
    }

    /// Move up to `bound` buried (or delayed) jobs back to ready
    pub fn kick(&mut self, bound: u32) -> Result<Reply> {
        self.transact(protocol::kick(bound))
    }

    /// Server-wide statistics
    pub fn stats(&mut self) -> Result<Reply> {
        self.transact(protocol::stats())
    }

    /// Statistics for one job
    pub fn stats_job(&mut self, jid: u64) -> Result<Reply> {
        self.transact(protocol::stats_job(jid))
    }

    /// Statistics for one tube
    pub fn stats_tube(&mut self, tube: &str) -> Result<Reply> {
        self.transact(protocol::stats_tube(tube)?)
    }

    /// All tubes known to the server
    pub fn list_tubes(&mut self) -> Result<Reply> {
        self.transact(protocol::list_tubes())
    }

    /// The tube puts currently go to
    pub fn using(&mut self) -> Result<String> {
        let reply = self.transact(protocol::list_tube_used())?;
        reply
            .tube()
            .map(str::to_string)
            .ok_or_else(|| BeanError::UnexpectedResponse("list-tube-used reply had no tube".to_string()))
    }

    /// The tubes currently watched
    pub fn watchlist(&mut self) -> Result<Vec<String>> {
        let reply = self.transact(protocol::list_tubes_watched())?;
        let tubes = reply
            .yaml_body()
            .and_then(|v| v.as_sequence())
            .ok_or_else(|| {
                BeanError::UnexpectedResponse("list-tubes-watched body is not a list".to_string())
            })?;
        tubes
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    BeanError::UnexpectedResponse("list-tubes-watched entry is not a string".to_string())
                })
            })
            .collect()
    }

    /// Make the watch list exactly `tubes`, issuing the minimal set of
    /// watch/ignore commands. An empty slice means just "default".
    pub fn set_watchlist(&mut self, tubes: &[&str]) -> Result<()> {
        let wanted: HashSet<&str> = if tubes.is_empty() {
            std::iter::once("default").collect()
        } else {
            tubes.iter().copied().collect()
        };
        let current = self.watchlist()?;
        let current: HashSet<&str> = current.iter().map(String::as_str).collect();

        for tube in wanted.difference(&current) {
            self.watch(tube)?;
        }
        for tube in current.difference(&wanted) {
            self.ignore(tube)?;
        }
        Ok(())
    }

    /// Ask the server for its advertised `max-job-size` and adopt it as
    /// the local put limit.
    pub fn refresh_max_job_size(&mut self) -> Result<usize> {
        let reply = self.stats()?;
        let size = reply
            .yaml_body()
            .and_then(|v| v.get("max-job-size"))
            .and_then(|v| v.as_u64())
            .ok_or_else(|| {
                BeanError::UnexpectedResponse("stats body carries no max-job-size".to_string())
            })?;
        self.max_job_size = size as usize;
        tracing::debug!("Adopted server max-job-size of {} bytes", size);
        Ok(self.max_job_size)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("peer_addr", &self.peer_addr)
            .field("max_job_size", &self.max_job_size)
            .finish()
    }
}

/// Drive a parser to completion against any byte source.
///
/// Reads up to `parser.remaining()` bytes at a time (a sizing hint; the
/// parser handles short and long reads alike) and feeds each chunk
/// until the parser yields. A zero-byte read means the peer closed the
/// connection mid-reply, surfaced as [`BeanError::ConnectionLost`] so
/// callers can tell network trouble from protocol trouble.
pub fn read_reply<R: Read>(reader: &mut R, parser: &mut ReplyParser) -> Result<Reply> {
    let mut buf = [0u8; 4096];
    loop {
        let want = parser.remaining().clamp(1, buf.len());
        let n = reader.read(&mut buf[..want])?;
        if n == 0 {
            return Err(BeanError::ConnectionLost(
                "remote server closed the connection".to_string(),
            ));
        }
        if let Some(reply) = parser.feed(&buf[..n])? {
            return Ok(reply);
        }
    }
}
