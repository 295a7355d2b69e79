//! Declarative schema model: entities, typed properties and relationships.
//!
//! Schemas are declared through the consuming builders in [`builder`] (or
//! loaded from YAML by [`yaml_loader`]) and validated once in
//! [`SchemaBuilder::build`]. The resulting [`Schema`] is read-only.

pub mod builder;
pub mod error;
pub mod types;
pub mod yaml_loader;

pub use builder::{EntityBuilder, PropertyBuilder, SchemaBuilder, ToManyBuilder};
pub use error::SchemaError;
pub use types::{
    Direction, Entity, Modules, OrderTerm, Property, PropertyType, Schema, ToMany, ToOne,
};
pub use yaml_loader::{load_schema, parse_schema, SchemaFile};
