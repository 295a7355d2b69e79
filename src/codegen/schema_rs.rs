//! Diesel `table!` definitions for every entity.

use std::collections::HashSet;
use std::io::{self, Write};

use crate::codegen::names::{field_name, id_property, EntityNames};
use crate::schema::Schema;

/// Generate `schema.rs`.
pub fn generate_schema<W: Write>(writer: &mut W, schema: &Schema) -> io::Result<()> {
    writeln!(writer, "// @generated automatically by daogen.")?;

    for entity in schema.entities() {
        let names = EntityNames::of(schema, entity);
        let id = id_property(entity)?;

        writeln!(writer)?;
        writeln!(writer, "diesel::table! {{")?;
        writeln!(writer, "    #[sql_name = {:?}]", entity.table_name)?;
        writeln!(writer, "    {} ({}) {{", names.module, field_name(&id.name))?;
        for property in &entity.properties {
            let diesel_type = property.property_type.diesel_type();
            let type_spec = if property.is_optional() {
                format!("Nullable<{}>", diesel_type)
            } else {
                diesel_type.to_string()
            };
            writeln!(writer, "        #[sql_name = {:?}]", property.column_name)?;
            writeln!(writer, "        {} -> {},", field_name(&property.name), type_spec)?;
        }
        writeln!(writer, "    }}")?;
        writeln!(writer, "}}")?;
    }

    // Diesel accepts a single joinable! per table pair
    let mut joined = HashSet::new();
    let mut joinables = Vec::new();
    for entity in schema.entities() {
        let child = EntityNames::of(schema, entity).module;
        for to_one in &entity.to_ones {
            let Some(target) = schema.entity(&to_one.target) else {
                continue;
            };
            let parent = EntityNames::of(schema, target).module;
            if child != parent && joined.insert((child.clone(), parent.clone())) {
                joinables.push(format!(
                    "diesel::joinable!({} -> {} ({}));",
                    child,
                    parent,
                    field_name(&to_one.fk_property)
                ));
            }
        }
    }
    if !joinables.is_empty() {
        writeln!(writer)?;
        for joinable in &joinables {
            writeln!(writer, "{}", joinable)?;
        }
    }

    if schema.entities.len() > 1 {
        let tables: Vec<String> = schema
            .entities()
            .map(|e| EntityNames::of(schema, e).module)
            .collect();
        writeln!(writer)?;
        writeln!(writer, "diesel::allow_tables_to_appear_in_same_query!(")?;
        for table in &tables {
            writeln!(writer, "    {},", table)?;
        }
        writeln!(writer, ");")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campus::campus_schema;

    fn render() -> String {
        let mut out = Vec::new();
        generate_schema(&mut out, &campus_schema().unwrap()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_tables() {
        let code = render();

        assert!(code.contains("    #[sql_name = \"FOOD_SERVICE\"]\n    food_service (id) {"));
        assert!(code.contains("        #[sql_name = \"_id\"]\n        id -> BigInt,"));
        assert!(code.contains("        latitude -> Double,"));
        assert!(code.contains("        built_year -> Integer,"));
        assert!(code.contains("        supplementary_info -> Nullable<Text>,"));
    }

    #[test]
    fn test_joinables() {
        let code = render();

        assert!(code.contains("diesel::joinable!(building -> location (location_id));"));
        assert!(code.contains("diesel::joinable!(department -> faculty (faculty_id));"));
        assert!(code.contains("diesel::joinable!(department -> building (building_id));"));
        assert!(code.contains("diesel::joinable!(library -> building (building_id));"));
        assert!(code.contains("diesel::joinable!(food_service -> building (building_id));"));
        assert_eq!(code.matches("diesel::joinable!").count(), 5);
    }

    #[test]
    fn test_allow_tables() {
        let code = render();
        assert!(code.contains("diesel::allow_tables_to_appear_in_same_query!(\n    faculty,\n    location,"));
    }
}
