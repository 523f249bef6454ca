//! Client Tests
//!
//! The blocking connection, pool, and job wrapper against a scripted
//! in-process server, plus the generic reply drive loop over plain
//! readers.

mod support;
