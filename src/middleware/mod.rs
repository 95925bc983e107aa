//! Middleware layer.
//!
//! The cross-cutting steps the dispatcher runs around every handler:
//!
//! - [`json`] parses an `application/json` body before the handler sees it
//! - [`trace`] opens a per-request span and records status and latency

pub mod json;
pub mod trace;
