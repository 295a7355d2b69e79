//! # daogen: entity schema model and DAO code generator
//!
//! daogen describes a local database as a declarative schema (entities,
//! typed properties, to-one and to-many relationships) and generates the Rust
//! sources that access it: entity structs, DAOs, a Diesel schema and DAO
//! tests.
//!
//! Schemas are declared in code with the immutable builders in [`schema`] or
//! loaded from YAML:
//!
//! ```yaml
//! schema:
//!   version: 1
//!   default_module: dao
//! entities:
//!   - name: Building
//!     properties:
//!       - { name: name, type: String, not_null: true }
//!     to_many:
//!       - name: departments
//!         target: Department
//!         fk: buildingId
//!         order:
//!           - { property: name, direction: asc }
//!   - name: Department
//!     properties:
//!       - { name: name, type: String, not_null: true }
//!       - { name: buildingId, type: Long, not_null: true }
//!     to_one:
//!       - { name: building, target: Building, fk: buildingId }
//! ```
//!
//! The built-in [`campus`] schema is what the `daogen` binary generates when
//! run without arguments.

pub mod campus;
pub mod codegen;
pub mod error;
pub mod schema;

pub use codegen::{generate_all, CodegenCallbacks, CodegenPipeline, GenerationReport};
pub use error::{Error, Result};
pub use schema::{Schema, SchemaBuilder, SchemaError};
