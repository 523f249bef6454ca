//! Job convenience wrapper
//!
//! An optional value type for keeping track of jobs handed out by the
//! server. It carries the id and payload from a reserve or peek reply
//! and offers the per-job operations against a borrowed connection.
//!
//! The mutating methods absorb `NOT_FOUND` into `Ok(false)`: a job
//! vanishing between calls (deleted elsewhere, TTR expired) is an
//! expected race for consumers, not a failure.

use bytes::Bytes;

use crate::client::Connection;
use crate::error::{BeanError, Result};
use crate::protocol::Reply;

/// One job handed out by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Server-assigned job id
    pub id: u64,

    /// Priority used when releasing or burying this job
    pub priority: u32,

    /// Opaque payload bytes
    pub payload: Bytes,

    /// Whether this job is held under a reservation (false for peeked
    /// jobs, which cannot be released, buried, or touched)
    pub reserved: bool,
}

impl Job {
    /// Build a job from a reserve or peek reply.
    ///
    /// The reply must carry a job id and a raw payload body.
    pub fn from_reply(reply: &Reply, reserved: bool) -> Result<Self> {
        let id = reply.jid().ok_or_else(|| {
            BeanError::UnexpectedResponse("reply carries no job id".to_string())
        })?;
        let payload = reply
            .raw_body()
            .cloned()
            .ok_or_else(|| BeanError::UnexpectedResponse("reply carries no payload".to_string()))?;
        Ok(Self {
            id,
            priority: 0,
            payload,
            reserved,
        })
    }

    /// Release the job back to the ready queue immediately.
    pub fn release(&self, conn: &mut Connection) -> Result<bool> {
        self.delay(conn, 0)
    }

    /// Release the job back to the queue after `delay` seconds.
    pub fn delay(&self, conn: &mut Connection, delay: u32) -> Result<bool> {
        absorb_not_found(conn.release(self.id, self.priority, delay))
    }

    /// Delete the job from the server; the normal end of a job's life.
    pub fn delete(&self, conn: &mut Connection) -> Result<bool> {
        absorb_not_found(conn.delete(self.id))
    }

    /// Ask for more time to finish the job.
    pub fn touch(&self, conn: &mut Connection) -> Result<bool> {
        absorb_not_found(conn.touch(self.id))
    }

    /// Bury the job, optionally adopting a new priority first.
    pub fn bury(&mut self, conn: &mut Connection, pri: Option<u32>) -> Result<bool> {
        if let Some(pri) = pri {
            self.priority = pri;
        }
        absorb_not_found(conn.bury(self.id, self.priority))
    }

    /// Server statistics for this job.
    pub fn stats(&self, conn: &mut Connection) -> Result<serde_yaml::Value> {
        let reply = conn.stats_job(self.id)?;
        reply
            .yaml_body()
            .cloned()
            .ok_or_else(|| BeanError::UnexpectedResponse("stats-job reply had no body".to_string()))
    }
}

/// `NOT_FOUND` means the job is already gone; report it as `false`
/// rather than an error.
fn absorb_not_found(result: Result<Reply>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(BeanError::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}
