//! Built-in campus schema: faculties, locations, buildings, departments,
//! libraries and food services.
//!
//! `config/campus.yaml` declares the same schema; the two are kept in sync
//! by the tests below.

use crate::schema::{EntityBuilder, PropertyBuilder, Schema, SchemaBuilder, SchemaError, ToManyBuilder};

pub const SCHEMA_VERSION: u32 = 1;

/// Module receiving entities and DAOs.
pub const DAO_MODULE: &str = "dao";

/// Module receiving generated DAO tests.
pub const DAO_TEST_MODULE: &str = "dao::test";

/// Where generated sources land, relative to the working directory.
pub const OUTPUT_DIR: &str = "../project/src-gen";

/// Build the campus schema.
pub fn campus_schema() -> Result<Schema, SchemaError> {
    SchemaBuilder::new(SCHEMA_VERSION)
        .default_module(DAO_MODULE)
        .dao_module(DAO_MODULE)
        .test_module(DAO_TEST_MODULE)
        .keep_sections(true)
        .entity(faculty())
        .entity(location())
        .entity(building())
        .entity(department())
        .entity(library())
        .entity(food_service())
        .build()
}

fn faculty() -> EntityBuilder {
    EntityBuilder::new("Faculty")
        .id_property()
        .property(PropertyBuilder::string("name").not_null())
}

fn location() -> EntityBuilder {
    EntityBuilder::new("Location")
        .id_property()
        .property(PropertyBuilder::double("latitude").not_null())
        .property(PropertyBuilder::double("longitude").not_null())
}

// One building has one location and many departments; the departments are
// derived from Department.buildingId rather than stored on the building.
fn building() -> EntityBuilder {
    EntityBuilder::new("Building")
        .id_property()
        .property(PropertyBuilder::string("name").not_null())
        .property(PropertyBuilder::long("locationId").not_null())
        .to_one("Location", "locationId", "location")
        .property(PropertyBuilder::string("builtBy").not_null())
        .property(PropertyBuilder::int("builtYear").not_null())
        .property(PropertyBuilder::string("supplementaryInfo"))
        .to_many(ToManyBuilder::new("Department", "buildingId", "departments").order_asc("name"))
}

fn department() -> EntityBuilder {
    EntityBuilder::new("Department")
        .id_property()
        .property(PropertyBuilder::long("facultyId").not_null())
        .property(PropertyBuilder::string("name").not_null())
        .property(PropertyBuilder::long("buildingId").not_null())
        .to_one("Faculty", "facultyId", "faculty")
        .to_one("Building", "buildingId", "building")
}

fn library() -> EntityBuilder {
    EntityBuilder::new("Library")
        .id_property()
        .property(PropertyBuilder::string("name").not_null())
        .property(PropertyBuilder::string("room").not_null())
        .property(PropertyBuilder::long("buildingId").not_null())
        .to_one("Building", "buildingId", "building")
}

fn food_service() -> EntityBuilder {
    EntityBuilder::new("FoodService")
        .id_property()
        .property(PropertyBuilder::string("name").not_null())
        .property(PropertyBuilder::string("floor").not_null())
        .property(PropertyBuilder::long("buildingId").not_null())
        .to_one("Building", "buildingId", "building")
        .property(PropertyBuilder::double("latitude").not_null())
        .property(PropertyBuilder::double("longitude").not_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{parse_schema, Direction, PropertyType};

    #[test]
    fn test_campus_entities() {
        let schema = campus_schema().unwrap();
        let names: Vec<_> = schema.entities().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Faculty", "Location", "Building", "Department", "Library", "FoodService"]
        );
        assert_eq!(schema.modules.test_module.as_deref(), Some("dao::test"));
    }

    #[test]
    fn test_every_entity_has_one_identity() {
        let schema = campus_schema().unwrap();
        for entity in schema.entities() {
            let ids = entity.properties.iter().filter(|p| p.primary_key).count();
            assert_eq!(ids, 1, "{}", entity.name);
            assert_eq!(entity.id_property().unwrap().name, "id");
        }
    }

    #[test]
    fn test_every_to_one_has_one_non_null_foreign_key() {
        let schema = campus_schema().unwrap();
        let mut count = 0;
        for entity in schema.entities() {
            for to_one in &entity.to_ones {
                let matching: Vec<_> = entity
                    .properties
                    .iter()
                    .filter(|p| p.name == to_one.fk_property)
                    .collect();
                assert_eq!(matching.len(), 1);
                assert!(matching[0].not_null);
                assert_eq!(matching[0].property_type, PropertyType::Long);
                count += 1;
            }
        }
        assert_eq!(count, 5);
    }

    #[test]
    fn test_building_departments_ordered_by_name() {
        let schema = campus_schema().unwrap();
        let building = schema.entity("Building").unwrap();
        assert_eq!(building.to_manys.len(), 1);

        let departments = &building.to_manys[0];
        assert_eq!(departments.target, "Department");
        assert_eq!(departments.target_property, "buildingId");
        assert_eq!(departments.order.len(), 1);
        assert_eq!(departments.order[0].property, "name");
        assert_eq!(departments.order[0].direction, Direction::Asc);
    }

    #[test]
    fn test_supplementary_info_is_nullable() {
        let schema = campus_schema().unwrap();
        let info = schema.entity("Building").unwrap().property("supplementaryInfo").unwrap();
        assert!(!info.not_null);
    }

    #[test]
    fn test_yaml_declares_same_schema() {
        let yaml = include_str!("../config/campus.yaml");
        let file = parse_schema(yaml).unwrap();
        assert_eq!(file.schema.output.as_deref(), Some(std::path::Path::new(OUTPUT_DIR)));
        assert_eq!(file.build().unwrap(), campus_schema().unwrap());
    }
}
