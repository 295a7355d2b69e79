//! Immutable builders producing a validated [`Schema`].
//!
//! Every builder method consumes `self` and returns the updated builder, so a
//! schema is declared as a single expression and handed over by value:
//!
//! ```
//! use daogen::schema::{EntityBuilder, PropertyBuilder, SchemaBuilder, ToManyBuilder};
//!
//! let schema = SchemaBuilder::new(1)
//!     .entity(
//!         EntityBuilder::new("Building")
//!             .id_property()
//!             .property(PropertyBuilder::string("name").not_null())
//!             .to_many(ToManyBuilder::new("Department", "buildingId", "departments").order_asc("name")),
//!     )
//!     .entity(
//!         EntityBuilder::new("Department")
//!             .id_property()
//!             .property(PropertyBuilder::string("name").not_null())
//!             .property(PropertyBuilder::long("buildingId").not_null())
//!             .to_one("Building", "buildingId", "building"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.entity_count(), 2);
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::codegen::utils::{is_keyword, to_screaming_snake_case, to_snake_case};
use crate::schema::error::SchemaError;
use crate::schema::types::{
    Direction, Entity, Modules, OrderTerm, Property, PropertyType, Schema, ToMany, ToOne,
};

const DEFAULT_MODULE: &str = "dao";

/// Declaration of a single property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyBuilder {
    name: String,
    property_type: PropertyType,
    not_null: bool,
    primary_key: bool,
    autoincrement: bool,
    unique: bool,
    index: bool,
    column_name: Option<String>,
    doc: Option<String>,
}

impl PropertyBuilder {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            not_null: false,
            primary_key: false,
            autoincrement: false,
            unique: false,
            index: false,
            column_name: None,
            doc: None,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Boolean)
    }

    pub fn short(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Short)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Int)
    }

    pub fn long(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Long)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Float)
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Double)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::String)
    }

    pub fn byte_array(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::ByteArray)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Date)
    }

    /// Conventional identity: a `Long` primary key named `id` stored in `_id`.
    pub fn id() -> Self {
        Self::long("id").primary_key().column_name("_id")
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn index(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    fn finish(self) -> Property {
        let column_name = self
            .column_name
            .unwrap_or_else(|| to_screaming_snake_case(&self.name));
        Property {
            name: self.name,
            property_type: self.property_type,
            not_null: self.not_null,
            primary_key: self.primary_key,
            autoincrement: self.autoincrement,
            unique: self.unique,
            index: self.index,
            column_name,
            doc: self.doc,
        }
    }
}

/// Declaration of a to-many relationship with optional ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ToManyBuilder {
    target: String,
    target_property: String,
    name: String,
    order: Vec<OrderTerm>,
}

impl ToManyBuilder {
    /// `target_property` is the foreign key on `target` that points back at the owner.
    pub fn new(
        target: impl Into<String>,
        target_property: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            target_property: target_property.into(),
            name: name.into(),
            order: Vec::new(),
        }
    }

    pub fn order_asc(self, property: impl Into<String>) -> Self {
        self.order(property, Direction::Asc)
    }

    pub fn order_desc(self, property: impl Into<String>) -> Self {
        self.order(property, Direction::Desc)
    }

    pub fn order(mut self, property: impl Into<String>, direction: Direction) -> Self {
        self.order.push(OrderTerm {
            property: property.into(),
            direction,
        });
        self
    }
}

/// Declaration of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBuilder {
    name: String,
    table_name: Option<String>,
    properties: Vec<PropertyBuilder>,
    to_ones: Vec<ToOne>,
    to_manys: Vec<ToManyBuilder>,
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            properties: Vec::new(),
            to_ones: Vec::new(),
            to_manys: Vec::new(),
        }
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Adds the conventional identity property, see [`PropertyBuilder::id`].
    pub fn id_property(self) -> Self {
        self.property(PropertyBuilder::id())
    }

    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.properties.push(property);
        self
    }

    /// `fk_property` must be a not-null `Long` property of this entity.
    pub fn to_one(
        mut self,
        target: impl Into<String>,
        fk_property: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.to_ones.push(ToOne {
            name: name.into(),
            target: target.into(),
            fk_property: fk_property.into(),
        });
        self
    }

    pub fn to_many(mut self, to_many: ToManyBuilder) -> Self {
        self.to_manys.push(to_many);
        self
    }
}

/// Declaration of a complete schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaBuilder {
    version: u32,
    default_module: String,
    dao_module: Option<String>,
    test_module: Option<String>,
    keep_sections: bool,
    entities: Vec<EntityBuilder>,
}

impl SchemaBuilder {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            default_module: DEFAULT_MODULE.to_string(),
            dao_module: None,
            test_module: None,
            keep_sections: false,
            entities: Vec::new(),
        }
    }

    /// Module receiving entity structs. Also used for DAOs unless
    /// [`dao_module`](Self::dao_module) is set.
    pub fn default_module(mut self, module: impl Into<String>) -> Self {
        self.default_module = module.into();
        self
    }

    pub fn dao_module(mut self, module: impl Into<String>) -> Self {
        self.dao_module = Some(module.into());
        self
    }

    pub fn test_module(mut self, module: impl Into<String>) -> Self {
        self.test_module = Some(module.into());
        self
    }

    pub fn keep_sections(mut self, enabled: bool) -> Self {
        self.keep_sections = enabled;
        self
    }

    pub fn entity(mut self, entity: EntityBuilder) -> Self {
        self.entities.push(entity);
        self
    }

    /// Validate every declaration and produce the finished schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        if self.version == 0 {
            return Err(SchemaError::InvalidVersion);
        }

        let dao_module = self
            .dao_module
            .unwrap_or_else(|| self.default_module.clone());
        validate_module_path(&self.default_module)?;
        validate_module_path(&dao_module)?;
        if let Some(ref test_module) = self.test_module {
            validate_module_path(test_module)?;
        }

        // First pass: entities and their own properties
        let mut entities: IndexMap<String, Entity> = IndexMap::new();
        let mut to_many_decls: Vec<(String, Vec<ToManyBuilder>)> = Vec::new();

        for decl in self.entities {
            if decl.name.is_empty() {
                return Err(SchemaError::EmptyName);
            }
            validate_identifier(&decl.name)?;
            // The snake_case name becomes a module and a Diesel table
            let module = to_snake_case(&decl.name);
            if is_keyword(&module) {
                return Err(SchemaError::ReservedName {
                    entity: decl.name,
                    module,
                });
            }
            if entities.contains_key(&decl.name) {
                return Err(SchemaError::DuplicateEntity(decl.name));
            }

            let properties = finish_properties(&decl.name, decl.properties)?;
            let table_name = decl
                .table_name
                .unwrap_or_else(|| to_screaming_snake_case(&decl.name));

            to_many_decls.push((decl.name.clone(), decl.to_manys));
            entities.insert(
                decl.name.clone(),
                Entity {
                    name: decl.name,
                    table_name,
                    properties,
                    to_ones: decl.to_ones,
                    to_manys: Vec::new(),
                },
            );
        }

        // Second pass: relationships, which may reference entities declared later
        for entity in entities.values() {
            validate_to_ones(entity, &entities)?;
        }

        for (owner, decls) in to_many_decls {
            let mut to_manys = Vec::with_capacity(decls.len());
            for decl in decls {
                to_manys.push(finish_to_many(&owner, decl, &entities)?);
            }
            if let Some(entity) = entities.get_mut(&owner) {
                entity.to_manys = to_manys;
            }
        }

        for entity in entities.values() {
            validate_accessor_names(entity)?;
        }

        Ok(Schema {
            version: self.version,
            modules: Modules {
                default_module: self.default_module,
                dao_module,
                test_module: self.test_module,
            },
            keep_sections: self.keep_sections,
            entities,
        })
    }
}

fn finish_properties(
    entity: &str,
    declared: Vec<PropertyBuilder>,
) -> Result<Vec<Property>, SchemaError> {
    let mut seen = HashSet::new();
    let mut properties = Vec::with_capacity(declared.len());

    for decl in declared {
        validate_identifier(&decl.name)?;
        // Generated field names are snake_case, so `builtBy` and `built_by` collide
        if !seen.insert(to_snake_case(&decl.name)) {
            return Err(SchemaError::DuplicateProperty {
                entity: entity.to_string(),
                property: decl.name,
            });
        }
        properties.push(decl.finish());
    }

    let ids: Vec<String> = properties
        .iter()
        .filter(|p| p.primary_key)
        .map(|p| p.name.clone())
        .collect();
    match ids.len() {
        0 => return Err(SchemaError::MissingIdProperty(entity.to_string())),
        1 => {}
        _ => {
            return Err(SchemaError::MultipleIdProperties {
                entity: entity.to_string(),
                properties: ids,
            })
        }
    }

    // Identity first, everything else keeps declaration order
    properties.sort_by_key(|p| !p.primary_key);
    Ok(properties)
}

fn validate_to_ones(entity: &Entity, entities: &IndexMap<String, Entity>) -> Result<(), SchemaError> {
    let mut used_fks = HashSet::new();

    for to_one in &entity.to_ones {
        validate_identifier(&to_one.name)?;
        if !entities.contains_key(&to_one.target) {
            return Err(SchemaError::UnknownEntity {
                entity: entity.name.clone(),
                target: to_one.target.clone(),
            });
        }
        validate_foreign_key(entity, &to_one.fk_property)?;
        if !used_fks.insert(to_one.fk_property.as_str()) {
            return Err(SchemaError::DuplicateForeignKey {
                entity: entity.name.clone(),
                property: to_one.fk_property.clone(),
            });
        }
    }

    Ok(())
}

fn finish_to_many(
    owner: &str,
    decl: ToManyBuilder,
    entities: &IndexMap<String, Entity>,
) -> Result<ToMany, SchemaError> {
    validate_identifier(&decl.name)?;
    let target = entities
        .get(&decl.target)
        .ok_or_else(|| SchemaError::UnknownEntity {
            entity: owner.to_string(),
            target: decl.target.clone(),
        })?;

    validate_foreign_key(target, &decl.target_property)?;

    for term in &decl.order {
        if target.property(&term.property).is_none() {
            return Err(SchemaError::UnknownProperty {
                entity: target.name.clone(),
                property: term.property.clone(),
            });
        }
    }

    Ok(ToMany {
        name: decl.name,
        target: decl.target,
        target_property: decl.target_property,
        order: decl.order,
    })
}

fn validate_foreign_key(entity: &Entity, property: &str) -> Result<(), SchemaError> {
    let fk = entity
        .property(property)
        .ok_or_else(|| SchemaError::UnknownProperty {
            entity: entity.name.clone(),
            property: property.to_string(),
        })?;

    if !fk.not_null {
        return Err(SchemaError::NullableForeignKey {
            entity: entity.name.clone(),
            property: property.to_string(),
        });
    }
    if fk.property_type != PropertyType::Long {
        return Err(SchemaError::ForeignKeyType {
            entity: entity.name.clone(),
            property: property.to_string(),
        });
    }

    Ok(())
}

/// Accessors become methods next to the generated fields, so their snake_case
/// names must be unique across properties and relations.
fn validate_accessor_names(entity: &Entity) -> Result<(), SchemaError> {
    let mut names: HashSet<String> = entity
        .properties
        .iter()
        .map(|p| to_snake_case(&p.name))
        .collect();

    let accessors = entity
        .to_ones
        .iter()
        .map(|t| &t.name)
        .chain(entity.to_manys.iter().map(|t| &t.name));

    for accessor in accessors {
        if !names.insert(to_snake_case(accessor)) {
            return Err(SchemaError::DuplicateRelation {
                entity: entity.name.clone(),
                name: accessor.clone(),
            });
        }
    }

    Ok(())
}

fn validate_identifier(name: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}

fn validate_module_path(path: &str) -> Result<(), SchemaError> {
    if path
        .split("::")
        .all(|segment| validate_identifier(segment).is_ok() && !is_keyword(segment))
    {
        Ok(())
    } else {
        Err(SchemaError::InvalidModulePath(path.to_string()))
    }
}
