//! Names of generated items and files for one entity.

use std::io;

use crate::codegen::utils::{crate_path, rust_ident, to_snake_case};
use crate::schema::{Entity, Property, Schema, ToMany};

#[derive(Debug, Clone, PartialEq)]
pub struct EntityNames {
    /// Entity struct, e.g. `FoodService`
    pub struct_name: String,
    /// Insertable struct, e.g. `NewFoodService`
    pub new_struct_name: String,
    /// File stem of the entity module and name of its Diesel table module
    pub module: String,
    pub dao_name: String,
    pub dao_module: String,
    pub test_module: String,
    /// `crate::`-rooted module path of the entity struct
    pub entity_path: String,
    /// `crate::`-rooted module path of the DAO
    pub dao_path: String,
    /// `crate::`-rooted path of the Diesel schema module
    pub schema_path: String,
}

impl EntityNames {
    pub fn of(schema: &Schema, entity: &Entity) -> Self {
        let module = to_snake_case(&entity.name);
        let dao_module = format!("{}_dao", module);

        Self {
            struct_name: entity.name.clone(),
            new_struct_name: format!("New{}", entity.name),
            test_module: format!("{}_dao_test", module),
            entity_path: crate_path(&schema.modules.default_module, &module),
            dao_path: crate_path(&schema.modules.dao_module, &dao_module),
            schema_path: crate_path(&schema.modules.dao_module, "schema"),
            dao_name: format!("{}Dao", entity.name),
            dao_module,
            module,
        }
    }

    /// Diesel table path relative to an imported `schema` module.
    pub fn table(&self) -> String {
        format!("schema::{}", self.module)
    }
}

/// Name of the DAO query backing a to-many accessor, e.g. `query_building_departments`.
pub fn to_many_query_name(owner: &Entity, to_many: &ToMany) -> String {
    format!("query_{}_{}", to_snake_case(&owner.name), to_snake_case(&to_many.name))
}

/// Identity property of an entity, as an I/O error when it is missing.
pub fn id_property(entity: &Entity) -> io::Result<&Property> {
    entity.id_property().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("entity '{}' has no identity property", entity.name),
        )
    })
}

/// Generated field name of a property.
pub fn field_name(property_name: &str) -> String {
    rust_ident(property_name)
}
