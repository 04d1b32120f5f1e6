//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce upstream deadline on the response head)
//!     → timeouts.rs (idle deadline on every relayed body frame)
//!     → On failure: surface 502/504 to the caller, never retry
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Single attempt per request; retry policy belongs to the caller
//! - Connect timeout lives on the connector, response deadline here

pub mod timeouts;

pub use timeouts::{bounded, BodyIdleTimeout, IdleTimeoutBody};
