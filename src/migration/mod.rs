//! Migration Module
//!
//! Everything between a schema diff and a migration file on disk:
//! - Operations (the query-interface calls)
//! - Field rendering (column definitions as Sequelize attributes)
//! - Synthesizer (paired forward/reverse operation lists)
//! - Renderer and file naming
//! - Store (writing and listing migration files)

pub mod field;
pub mod naming;
pub mod operations;
pub mod render;
pub mod store;
pub mod synthesizer;

pub use field::{DefaultExpr, FieldSpec, TypeExpr};
pub use operations::MigrationOp;
pub use render::MigrationRenderer;
pub use store::{MigrationEntry, MigrationStore};
pub use synthesizer::{MigrationArtifact, MigrationSynthesizer};
