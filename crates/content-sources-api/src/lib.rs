//! API server for Content Sources.
//!
//! Provides the versioned HTTP REST API over the repository DAO.

pub mod error;
pub mod identity;
pub mod pagination;
pub mod routes;
pub mod state;

pub use identity::Identity;
pub use state::AppState;
