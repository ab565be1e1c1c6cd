//! `atelier-core` -- domain logic of the Atelier production tracker.
//!
//! Status values and lists, the status capability shared by status-bearing
//! entities, the project / asset / user records, and the status store seam.
//! Nothing here talks to a database; `atelier-db` implements the store on
//! PostgreSQL.

pub mod error;
pub mod models;
pub mod payload;
pub mod status;
pub mod status_state;
pub mod store;
pub mod types;

pub use error::CoreError;
pub use status::{Status, StatusList};
pub use status_state::{EntityTarget, StatusBearing, StatusSelector, StatusState};
pub use store::{InMemoryStatusStore, StatusListStore};
