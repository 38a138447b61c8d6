//! Simulation engine
//!
//! Replays generated migrations in memory before they are written.

mod dry_run;

pub use dry_run::{DryRunResult, DryRunner, SchemaState};
