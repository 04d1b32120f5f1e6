//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request URI (path, query)
//!     → rewrite.rs (extract target, apply rewrite policy)
//!     → Return: Forward { authority, uri } or RewriteError
//! ```
//!
//! # Design Decisions
//! - One route prefix; the destination is carried by the request itself
//! - Rewriter is built once from config and shared immutably
//! - Deterministic: same URI always resolves to the same upstream URI

pub mod rewrite;

pub use rewrite::{Forward, RewriteError, Rewriter, PATH_PARAM, TARGET_PARAM};
