//! Connection Pool
//!
//! A fixed-size pool for handing whole connections to worker threads.
//! Each checked-out connection is exclusively owned until the guard
//! drops, so the per-connection FIFO discipline holds without any
//! locking inside the protocol core.

use std::ops::{Deref, DerefMut};

use parking_lot::{Condvar, Mutex};

use crate::config::Config;
use crate::error::Result;
use super::Connection;

/// Fixed-size pool of beanstalkd connections
pub struct ConnectionPool {
    idle: Mutex<Vec<Connection>>,
    available: Condvar,
}

impl ConnectionPool {
    /// Open `size` connections to the server named by the config.
    pub fn connect(config: &Config, size: usize) -> Result<Self> {
        let mut idle = Vec::with_capacity(size);
        for _ in 0..size {
            idle.push(Connection::connect(config)?);
        }
        tracing::debug!("Opened pool of {} connections to {}", size, config.server_addr);
        Ok(Self {
            idle: Mutex::new(idle),
            available: Condvar::new(),
        })
    }

    /// Check out a connection, blocking until one is free.
    pub fn get(&self) -> PooledConnection<'_> {
        let mut idle = self.idle.lock();
        while idle.is_empty() {
            self.available.wait(&mut idle);
        }
        let conn = idle.pop();
        PooledConnection { pool: self, conn }
    }

    /// Check out a connection if one is free right now.
    pub fn try_get(&self) -> Option<PooledConnection<'_>> {
        let conn = self.idle.lock().pop()?;
        Some(PooledConnection { pool: self, conn: Some(conn) })
    }

    fn put_back(&self, conn: Connection) {
        self.idle.lock().push(conn);
        self.available.notify_one();
    }
}

/// A checked-out connection; returns itself to the pool on drop.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    conn: Option<Connection>,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Some until drop by construction
        self.conn.as_ref().unwrap()
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().unwrap()
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put_back(conn);
        }
    }
}
