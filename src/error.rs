//! Error types for beanqueue
//!
//! Provides a unified error type for all operations. Server-reported
//! errors get one variant per protocol error word so callers can
//! pattern-match on failure kind instead of inspecting strings.

use thiserror::Error;

/// Result type alias using BeanError
pub type Result<T> = std::result::Result<T, BeanError>;

/// Unified error type for beanqueue operations
#[derive(Debug, Error)]
pub enum BeanError {
    // -------------------------------------------------------------------------
    // Server-reported errors (one per protocol error word)
    // -------------------------------------------------------------------------
    #[error("server out of memory")]
    OutOfMemory,

    #[error("server internal error")]
    InternalError,

    #[error("server is draining and not accepting new jobs")]
    Draining,

    /// Also raised locally for an invalid tube name, before any bytes
    /// are sent.
    #[error("bad format: {0}")]
    BadFormat(String),

    #[error("server did not recognize the command")]
    UnknownCommand,

    #[error("expected line terminator: {0}")]
    ExpectedCrlf(String),

    /// Also raised locally when a put payload meets or exceeds the
    /// configured max job size, before any bytes are sent.
    #[error("job too big: {0}")]
    JobTooBig(String),

    #[error("job or tube not found")]
    NotFound,

    #[error("tube not ignored (cannot ignore the only watched tube)")]
    NotIgnored,

    #[error("deadline soon for a reserved job")]
    DeadlineSoon,

    // -------------------------------------------------------------------------
    // Protocol errors (malformed or unexpected server output)
    // -------------------------------------------------------------------------
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("response body decode failed: {0}")]
    BodyDecode(String),

    // -------------------------------------------------------------------------
    // Transport errors
    // -------------------------------------------------------------------------
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Map a response header line to a server-reported error, if its first
/// token is one of the protocol error words.
///
/// Must be consulted before any per-operation descriptor lookup: error
/// words are global and short-circuit normal response handling.
pub fn check_error_line(line: &str) -> Result<()> {
    let word = line.split(' ').next().unwrap_or("");
    match word {
        "OUT_OF_MEMORY" => Err(BeanError::OutOfMemory),
        "INTERNAL_ERROR" => Err(BeanError::InternalError),
        "DRAINING" => Err(BeanError::Draining),
        "BAD_FORMAT" => Err(BeanError::BadFormat(format!("server returned: {line}"))),
        "UNKNOWN_COMMAND" => Err(BeanError::UnknownCommand),
        "EXPECTED_CRLF" => Err(BeanError::ExpectedCrlf(format!("server returned: {line}"))),
        "JOB_TOO_BIG" => Err(BeanError::JobTooBig(format!("server returned: {line}"))),
        "NOT_FOUND" => Err(BeanError::NotFound),
        "NOT_IGNORED" => Err(BeanError::NotIgnored),
        "DEADLINE_SOON" => Err(BeanError::DeadlineSoon),
        _ => Ok(()),
    }
}
