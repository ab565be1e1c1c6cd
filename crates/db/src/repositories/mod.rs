//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` (or a connection, for use inside a caller's transaction) as the
//! first argument.

pub mod status_list_repo;
pub mod status_repo;

pub use status_list_repo::StatusListRepo;
pub use status_repo::StatusRepo;
