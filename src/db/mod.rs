//! Database module: row models, SQL repositories and schema diagnostics.
//!
//! - `model`: typed rows returned by repositories.
//! - `repo`: SQL-only functions that map rows into entities.
//! - `schema`: compares a live database against the expected layout.
//!
//! Callers import from `homewatch::db`; the repository API is re-exported.

pub mod model;
pub mod repo;
pub mod schema;

pub use repo::*;

pub use model::{HouseholdTask, PlantRow, PlantType, PlantUpdate, TaskUpdate, Tip, UserRecord};
