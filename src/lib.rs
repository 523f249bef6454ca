//! # beanqueue
//!
//! A client library for the beanstalkd job-queue protocol with:
//! - Typed command encoders and a static response descriptor table
//! - An incremental, chunk-at-a-time response parser
//! - A blocking TCP client and a fixed-size connection pool
//! - A Job convenience wrapper for consumers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Callers                               │
//! │        (producers, workers, CLI, event loops)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Client / Pool                               │
//! │   (owns the TCP stream, serializes interactions)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Encoders   │          │ ReplyParser │
//!   │ (command)   │          │ (handler)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └──────────┬─────────────┘
//!                     ▼
//!             ┌─────────────┐
//!             │ Descriptors │
//!             │ (response)  │
//!             └─────────────┘
//! ```
//!
//! The protocol core (encoders, descriptors, parser) performs no I/O
//! and holds no shared state, so the same code serves a blocking
//! client, a thread pool, or a readiness-driven event loop.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod client;
pub mod job;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BeanError, Result};
pub use config::Config;
pub use client::{Connection, ConnectionPool};
pub use job::Job;
pub use protocol::{Body, Outcome, Reply, ReplyParser, Request};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of beanqueue
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
