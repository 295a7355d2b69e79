//! Type definitions for the finished schema model.
//!
//! [`Schema`] and [`Entity`] values are only produced by [`SchemaBuilder::build`],
//! which validates every cross reference. Their fields are read through
//! accessors so callers cannot break those invariants afterwards.
//!
//! [`SchemaBuilder::build`]: crate::schema::SchemaBuilder::build

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column type of a property.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PropertyType {
    Boolean,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    ByteArray,
    Date,
}

impl PropertyType {
    /// SQLite storage class used in generated DDL.
    pub fn sql_type(&self) -> &'static str {
        match self {
            PropertyType::Boolean
            | PropertyType::Short
            | PropertyType::Int
            | PropertyType::Long
            | PropertyType::Date => "INTEGER",
            PropertyType::Float | PropertyType::Double => "REAL",
            PropertyType::String => "TEXT",
            PropertyType::ByteArray => "BLOB",
        }
    }

    /// Rust type of the generated struct field (without `Option`).
    pub fn rust_type(&self) -> &'static str {
        match self {
            PropertyType::Boolean => "bool",
            PropertyType::Short => "i16",
            PropertyType::Int => "i32",
            PropertyType::Long => "i64",
            PropertyType::Float => "f32",
            PropertyType::Double => "f64",
            PropertyType::String => "String",
            PropertyType::ByteArray => "Vec<u8>",
            PropertyType::Date => "chrono::NaiveDateTime",
        }
    }

    /// Diesel SQL type used inside `table!` definitions.
    pub fn diesel_type(&self) -> &'static str {
        match self {
            PropertyType::Boolean => "Bool",
            PropertyType::Short => "SmallInt",
            PropertyType::Int => "Integer",
            PropertyType::Long => "BigInt",
            PropertyType::Float => "Float",
            PropertyType::Double => "Double",
            PropertyType::String => "Text",
            PropertyType::ByteArray => "Binary",
            PropertyType::Date => "Timestamp",
        }
    }

    /// Rust literal used as a sample value in generated tests.
    pub fn sample_value(&self) -> &'static str {
        match self {
            PropertyType::Boolean => "true",
            PropertyType::Short => "7",
            PropertyType::Int => "42",
            PropertyType::Long => "1",
            PropertyType::Float => "1.5",
            PropertyType::Double => "2.5",
            PropertyType::String => "\"sample\".to_string()",
            PropertyType::ByteArray => "vec![1, 2, 3]",
            PropertyType::Date => "chrono::NaiveDateTime::default()",
        }
    }

    /// Rust expression deriving a distinct sample value from the `i32`
    /// variable `n`, for columns that must not repeat.
    pub fn indexed_sample_value(&self, n: &str) -> String {
        match self {
            PropertyType::Boolean => format!("{} % 2 == 0", n),
            PropertyType::Short => format!("{} as i16", n),
            PropertyType::Int => n.to_string(),
            PropertyType::Long => format!("i64::from({})", n),
            PropertyType::Float => format!("{} as f32", n),
            PropertyType::Double => format!("f64::from({})", n),
            PropertyType::String => format!("format!(\"sample{{}}\", {})", n),
            PropertyType::ByteArray => format!("{}.to_be_bytes().to_vec()", n),
            PropertyType::Date => format!(
                "chrono::NaiveDateTime::default() + chrono::Duration::seconds(i64::from({}))",
                n
            ),
        }
    }
}

/// A typed column of an entity.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Property {
    pub name: String,
    pub property_type: PropertyType,
    pub not_null: bool,
    pub primary_key: bool,
    pub autoincrement: bool,
    pub unique: bool,
    pub index: bool,
    pub column_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl Property {
    /// Whether the generated field is wrapped in `Option`.
    pub fn is_optional(&self) -> bool {
        !self.not_null && !self.primary_key
    }

    /// Rust type of the generated field, including `Option` for nullable columns.
    pub fn rust_field_type(&self) -> String {
        if self.is_optional() {
            format!("Option<{}>", self.property_type.rust_type())
        } else {
            self.property_type.rust_type().to_string()
        }
    }
}

/// Sort direction of a to-many ordering term.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    /// Diesel expression method applied to an ordering column.
    pub fn as_method(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// One ordering term of a to-many relationship.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderTerm {
    pub property: String,
    pub direction: Direction,
}

/// Many-to-one association: the owning entity holds the foreign key.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToOne {
    /// Accessor name generated on the owning entity.
    pub name: String,
    pub target: String,
    /// Foreign-key property on the owning entity.
    pub fk_property: String,
}

/// One-to-many association derived from a foreign key on the target entity.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToMany {
    /// Accessor name generated on the owning entity.
    pub name: String,
    pub target: String,
    /// Foreign-key property on the target entity pointing back at the owner.
    pub target_property: String,
    pub order: Vec<OrderTerm>,
}

/// A named record type mapped to one table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Entity {
    pub(crate) name: String,
    pub(crate) table_name: String,
    pub(crate) properties: Vec<Property>,
    pub(crate) to_ones: Vec<ToOne>,
    pub(crate) to_manys: Vec<ToMany>,
}

impl Entity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// All properties, identity first.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn to_ones(&self) -> &[ToOne] {
        &self.to_ones
    }

    pub fn to_manys(&self) -> &[ToMany] {
        &self.to_manys
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The identity property. Always present in a built schema.
    pub fn id_property(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.primary_key)
    }

    /// Properties excluding the identity, in declaration order.
    pub fn data_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| !p.primary_key)
    }

    /// Whether `property` is the foreign key of one of this entity's to-one relations.
    pub fn is_foreign_key(&self, property: &str) -> bool {
        self.to_ones.iter().any(|t| t.fk_property == property)
    }
}

/// Module layout of generated code.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Modules {
    /// Module receiving entity structs.
    pub default_module: String,
    /// Module receiving DAOs, the Diesel schema and the DAO master.
    pub dao_module: String,
    /// Module receiving generated DAO tests, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_module: Option<String>,
}

/// A finished, validated schema.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Schema {
    pub(crate) version: u32,
    pub(crate) modules: Modules,
    pub(crate) keep_sections: bool,
    pub(crate) entities: IndexMap<String, Entity>,
}

impl Schema {
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn modules(&self) -> &Modules {
        &self.modules
    }

    pub fn keep_sections(&self) -> bool {
        self.keep_sections
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// To-many relationships of other entities whose target is `target`,
    /// paired with their owning entity.
    pub fn incoming_to_manys<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = (&'a Entity, &'a ToMany)> + 'a {
        self.entities.values().flat_map(move |owner| {
            owner
                .to_manys
                .iter()
                .filter(move |tm| tm.target == target)
                .map(move |tm| (owner, tm))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, property_type: PropertyType, not_null: bool) -> Property {
        Property {
            name: name.to_string(),
            property_type,
            not_null,
            primary_key: false,
            autoincrement: false,
            unique: false,
            index: false,
            column_name: name.to_uppercase(),
            doc: None,
        }
    }

    #[test]
    fn test_nullable_field_type() {
        assert_eq!(prop("info", PropertyType::String, false).rust_field_type(), "Option<String>");
        assert_eq!(prop("year", PropertyType::Int, true).rust_field_type(), "i32");
    }

    #[test]
    fn test_primary_key_is_never_optional() {
        let mut id = prop("id", PropertyType::Long, false);
        id.primary_key = true;
        assert!(!id.is_optional());
        assert_eq!(id.rust_field_type(), "i64");
    }

    #[test]
    fn test_sql_types() {
        assert_eq!(PropertyType::Double.sql_type(), "REAL");
        assert_eq!(PropertyType::Long.sql_type(), "INTEGER");
        assert_eq!(PropertyType::String.sql_type(), "TEXT");
        assert_eq!(PropertyType::ByteArray.sql_type(), "BLOB");
    }

    #[test]
    fn test_indexed_sample_values() {
        assert_eq!(PropertyType::String.indexed_sample_value("n"), "format!(\"sample{}\", n)");
        assert_eq!(PropertyType::Long.indexed_sample_value("n"), "i64::from(n)");
        assert_eq!(PropertyType::Boolean.indexed_sample_value("n"), "n % 2 == 0");
    }
}
