//! QRSS grabber CLI library.
//!
//! This crate provides the scheduling loop, recording sessions and spool
//! writer behind the `qrss` binary, plus its command implementations.

pub mod cli_args;
pub mod clock;
pub mod commands;
pub mod scheduler;
pub mod session;
pub mod spool;
