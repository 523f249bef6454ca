//! Client Module
//!
//! Transport-owning collaborators that drive the protocol core: a
//! blocking single-connection client and a fixed-size connection pool
//! for thread-per-connection use. Both uphold the protocol's FIFO
//! contract by giving each in-flight interaction exclusive use of one
//! connection.

mod connection;
mod pool;

pub use connection::{read_reply, Connection};
pub use pool::{ConnectionPool, PooledConnection};
