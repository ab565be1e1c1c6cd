//! Row models.
//!
//! Each submodule contains `FromRow` structs matching database rows and the
//! conversions into `atelier-core` domain types.

pub mod status;
