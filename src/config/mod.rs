//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (PORT, PROXY_*)
//!     → loader.rs (read & parse, defaults for unset vars)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to HttpServer at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so an empty environment is a valid config
//! - Handlers never read the environment; only the loader does

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from_env, load_with, ConfigError};
pub use schema::ForwardingConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProxyConfig;
pub use schema::RewritePolicy;
pub use schema::TimeoutConfig;
