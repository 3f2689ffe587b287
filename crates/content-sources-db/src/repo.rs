//! DAO traits and implementations.

pub mod repository;

pub use repository::{
    BulkCreateResult, PgRepositoryDao, Repository, RepositoryConfiguration, RepositoryDao,
};
