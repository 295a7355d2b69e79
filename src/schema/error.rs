//! Schema construction errors.

use thiserror::Error;

/// Validation failure raised by [`SchemaBuilder::build`](crate::schema::SchemaBuilder::build).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Entity name cannot be empty")]
    EmptyName,

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("Schema version must be positive")]
    InvalidVersion,

    #[error("Entity '{entity}' maps to the Rust keyword '{module}'")]
    ReservedName { entity: String, module: String },

    #[error("Invalid module path '{0}'")]
    InvalidModulePath(String),

    #[error("Entity '{0}' is declared more than once")]
    DuplicateEntity(String),

    #[error("Property '{property}' is declared more than once in entity '{entity}'")]
    DuplicateProperty { entity: String, property: String },

    #[error("Entity '{0}' has no identity property")]
    MissingIdProperty(String),

    #[error("Entity '{entity}' has more than one identity property: {properties:?}")]
    MultipleIdProperties { entity: String, properties: Vec<String> },

    #[error("Entity '{entity}' references unknown entity '{target}'")]
    UnknownEntity { entity: String, target: String },

    #[error("Entity '{entity}' has no property '{property}'")]
    UnknownProperty { entity: String, property: String },

    #[error("Foreign key '{entity}.{property}' must be declared not null")]
    NullableForeignKey { entity: String, property: String },

    #[error("Foreign key '{entity}.{property}' must be of type Long")]
    ForeignKeyType { entity: String, property: String },

    #[error("Foreign key '{entity}.{property}' is shared by more than one to-one relation")]
    DuplicateForeignKey { entity: String, property: String },

    #[error("Relation '{name}' of entity '{entity}' collides with another property or relation")]
    DuplicateRelation { entity: String, name: String },
}
