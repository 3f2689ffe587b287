//! Configuration for Content Sources.
//!
//! This crate handles:
//! - System configuration (content-sources.kdl)
//! - Environment overrides and the versioned routing roots
//! - External repository lists used to seed public repositories

pub mod error;
pub mod external;
pub mod system;

pub use error::{ConfigError, ConfigResult};
pub use system::{DatabaseConfig, RoutingConfig, ServerConfig, SystemConfig};
