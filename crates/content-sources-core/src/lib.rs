//! Core types for the Content Sources repository registry.
//!
//! This crate contains:
//! - Request and response shapes for repository configurations
//! - The filter/pagination translator used by list queries
//! - The static catalogue of distribution versions and architectures

pub mod filter;
pub mod parameters;
pub mod repository;

pub use filter::{FilterData, PaginationData, Predicate};
pub use parameters::RepositoryParameterResponse;
pub use repository::{
    Links, RepositoryBulkCreateResponse, RepositoryCollectionResponse, RepositoryRequest,
    RepositoryResponse, ResponseMetadata,
};
