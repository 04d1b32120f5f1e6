//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, CORS)
//!     → routing layer resolves target + forward path
//!     → request.rs (strip hop-by-hop headers, rewrite Host)
//!     → upstream validator (single attempt, bounded wait)
//!     → response.rs (relay as-is, or map failure to 400/502/504)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::HttpServer;
