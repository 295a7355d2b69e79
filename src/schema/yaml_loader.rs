//! YAML schema loader.
//!
//! A schema file has a `schema:` header and an `entities:` list:
//!
//! ```yaml
//! schema:
//!   version: 1
//!   default_module: dao
//!   test_module: dao::test
//!   keep_sections: true
//!   output: ../project/src-gen
//! entities:
//!   - name: Department
//!     properties:
//!       - { name: name, type: String, not_null: true }
//!       - { name: buildingId, type: Long, not_null: true }
//!     to_one:
//!       - { name: building, target: Building, fk: buildingId }
//! ```
//!
//! Documents are converted into a [`SchemaBuilder`], so YAML schemas go
//! through exactly the same validation as schemas declared in code.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::schema::builder::{EntityBuilder, PropertyBuilder, SchemaBuilder, ToManyBuilder};
use crate::schema::error::SchemaError;
use crate::schema::types::{Direction, PropertyType, Schema};

fn default_true() -> bool {
    true
}

/// Top-level structure of a schema YAML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    pub schema: SchemaHeader,
    #[serde(default)]
    pub entities: Vec<EntityYaml>,
}

/// Schema-wide settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaHeader {
    pub version: u32,
    #[serde(default)]
    pub default_module: Option<String>,
    #[serde(default)]
    pub dao_module: Option<String>,
    #[serde(default)]
    pub test_module: Option<String>,
    #[serde(default)]
    pub keep_sections: bool,
    /// Output directory for generated sources, relative to the working directory.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityYaml {
    pub name: String,
    /// Add the conventional `id` identity property.
    #[serde(default = "default_true")]
    pub id: bool,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyYaml>,
    #[serde(default)]
    pub to_one: Vec<ToOneYaml>,
    #[serde(default)]
    pub to_many: Vec<ToManyYaml>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyYaml {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub autoincrement: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub index: bool,
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToOneYaml {
    pub name: String,
    pub target: String,
    pub fk: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToManyYaml {
    pub name: String,
    pub target: String,
    /// Foreign-key property on the target entity.
    pub fk: String,
    #[serde(default)]
    pub order: Vec<OrderYaml>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderYaml {
    pub property: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SchemaFile {
    /// Convert the document into an (unvalidated) builder.
    pub fn into_builder(self) -> SchemaBuilder {
        let header = self.schema;
        let mut builder = SchemaBuilder::new(header.version).keep_sections(header.keep_sections);

        if let Some(module) = header.default_module {
            builder = builder.default_module(module);
        }
        if let Some(module) = header.dao_module {
            builder = builder.dao_module(module);
        }
        if let Some(module) = header.test_module {
            builder = builder.test_module(module);
        }

        self.entities
            .into_iter()
            .fold(builder, |builder, entity| builder.entity(entity.into_builder()))
    }

    /// Validate the document and produce the finished schema.
    pub fn build(self) -> std::result::Result<Schema, SchemaError> {
        self.into_builder().build()
    }
}

impl EntityYaml {
    fn into_builder(self) -> EntityBuilder {
        let mut entity = EntityBuilder::new(self.name);
        if let Some(table_name) = self.table_name {
            entity = entity.table_name(table_name);
        }
        if self.id {
            entity = entity.id_property();
        }

        for property in self.properties {
            entity = entity.property(property.into_builder());
        }
        for to_one in self.to_one {
            entity = entity.to_one(to_one.target, to_one.fk, to_one.name);
        }
        for to_many in self.to_many {
            let decl = to_many
                .order
                .into_iter()
                .fold(ToManyBuilder::new(to_many.target, to_many.fk, to_many.name), |decl, term| {
                    decl.order(term.property, term.direction)
                });
            entity = entity.to_many(decl);
        }

        entity
    }
}

impl PropertyYaml {
    fn into_builder(self) -> PropertyBuilder {
        let mut property = PropertyBuilder::new(self.name, self.property_type);
        if self.not_null {
            property = property.not_null();
        }
        if self.primary_key {
            property = property.primary_key();
        }
        if self.autoincrement {
            property = property.autoincrement();
        }
        if self.unique {
            property = property.unique();
        }
        if self.index {
            property = property.index();
        }
        if let Some(column_name) = self.column_name {
            property = property.column_name(column_name);
        }
        if let Some(doc) = self.doc {
            property = property.doc(doc);
        }
        property
    }
}

/// Parse a schema document from a YAML string.
pub fn parse_schema(yaml: &str) -> std::result::Result<SchemaFile, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

/// Load a schema document from a YAML file.
///
/// The document is only parsed here; call [`SchemaFile::build`] to validate it.
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<SchemaFile> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    parse_schema(&content).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
