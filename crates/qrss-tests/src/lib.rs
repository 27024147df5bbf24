//! QRSS Grabber End-to-End Test Infrastructure
//!
//! Integration tests for the flows that cross crate boundaries:
//!
//! - Offline: recording file -> waterfall PNG
//! - Scheduling: wall-clock boundaries -> sessions -> spool files
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qrss-tests
//! ```
//!
//! Scheduler tests run on a paused tokio clock, so a ten minute period
//! completes instantly.

pub mod fixtures;
pub mod scripted;
