//! Domain records of the production tracker.
//!
//! Status-bearing entities ([`project::Project`], [`asset::Asset`]) embed a
//! [`crate::status_state::StatusState`]; the rest are plain records.

pub mod asset;
pub mod auth;
pub mod project;
pub mod project_user;
pub mod repository;
