//! Domain building blocks for the counseling records client.
//!
//! This crate has zero internal dependencies so the HTTP layer, the
//! record-management layer and any CLI tooling can all share it.

pub mod appointment;
pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod record;
pub mod schema;
pub mod types;
pub mod wizard;
