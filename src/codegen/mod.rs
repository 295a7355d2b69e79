//! Code generation from a finished [`Schema`].
//!
//! Generated code targets Diesel on SQLite. For every entity the generator
//! writes an entity module, a DAO and (optionally) DAO tests, plus a shared
//! Diesel `schema.rs`, a DAO master and the `mod.rs` files wiring them up.

pub mod dao_master_rs;
pub mod dao_rs;
pub mod dao_test_rs;
pub mod entity_rs;
pub mod fs_utils;
pub mod keep_sections;
pub mod mod_rs;
pub mod names;
pub mod pipeline;
pub mod schema_rs;
pub mod sql;
pub mod utils;

use std::path::Path;

use crate::error::Result;
use crate::schema::Schema;

pub use pipeline::{CodegenCallbacks, CodegenPipeline, GenerationReport, NoOpCallbacks};

/// First line of every generated Rust file.
pub const GENERATED_HEADER: &str =
    "// @generated by daogen. Changes outside KEEP regions are overwritten.";

/// Generate all sources for `schema` under `output_dir`.
///
/// Running it twice on the same schema leaves every file byte-identical.
///
/// # Example
///
/// ```rust,no_run
/// let schema = daogen::campus::campus_schema()?;
/// let report = daogen::codegen::generate_all(&schema, "../project/src-gen")?;
/// println!("{} files written", report.written.len());
/// # Ok::<(), daogen::Error>(())
/// ```
pub fn generate_all(schema: &Schema, output_dir: impl AsRef<Path>) -> Result<GenerationReport> {
    CodegenPipeline::new(schema, output_dir.as_ref()).run()
}
