//! Falcon migrate
//!
//! Compares two snapshots of a Sequelize model's table and synthesizes the
//! migration between them: a forward `up` procedure, a reverse `down`
//! procedure, and the timestamped file they are written to.

pub mod config;
pub mod error;
pub mod migration;
pub mod models;
pub mod simulation;
pub mod snapshot;
