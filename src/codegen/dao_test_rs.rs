//! Generated DAO tests, run against an in-memory SQLite database.

use std::io::{self, Write};

use crate::codegen::names::{field_name, id_property, EntityNames};
use crate::codegen::GENERATED_HEADER;
use crate::schema::{Entity, Schema};

/// Generate the test module of one DAO.
pub fn generate_dao_test<W: Write>(writer: &mut W, schema: &Schema, entity: &Entity) -> io::Result<()> {
    let names = EntityNames::of(schema, entity);
    let id_field = field_name(&id_property(entity)?.name);
    let has_data = entity.data_properties().next().is_some();

    writeln!(writer, "{}", GENERATED_HEADER)?;
    writeln!(writer)?;
    writeln!(writer, "use diesel::prelude::*;")?;
    writeln!(writer, "use diesel::sqlite::SqliteConnection;")?;
    writeln!(writer)?;
    if has_data {
        writeln!(writer, "use {}::{};", names.entity_path, names.new_struct_name)?;
    }
    writeln!(writer, "use {}::{};", names.dao_path, names.dao_name)?;
    writeln!(writer)?;

    writeln!(writer, "fn setup() -> SqliteConnection {{")?;
    writeln!(
        writer,
        "    let mut conn = SqliteConnection::establish(\":memory:\").expect(\"in-memory database\");"
    )?;
    writeln!(
        writer,
        "    {}::create_table(&mut conn, false).expect(\"create table\");",
        names.dao_name
    )?;
    writeln!(writer, "    conn")?;
    writeln!(writer, "}}")?;
    writeln!(writer)?;

    // Unique columns take their value from the row index so two samples never clash
    if has_data {
        let has_unique = entity.data_properties().any(|p| p.unique);
        let param = if has_unique { "n" } else { "_n" };
        writeln!(writer, "fn sample({}: i32) -> {} {{", param, names.new_struct_name)?;
        writeln!(writer, "    {} {{", names.new_struct_name)?;
        for property in entity.data_properties() {
            let value = if property.unique {
                property.property_type.indexed_sample_value("n")
            } else {
                property.property_type.sample_value().to_string()
            };
            if property.is_optional() {
                writeln!(writer, "        {}: Some({}),", field_name(&property.name), value)?;
            } else {
                writeln!(writer, "        {}: {},", field_name(&property.name), value)?;
            }
        }
        writeln!(writer, "    }}")?;
        writeln!(writer, "}}")?;
        writeln!(writer)?;
    }
    let insert_call = |n: u32| {
        if has_data {
            format!("{}::insert(&mut conn, &sample({}))", names.dao_name, n)
        } else {
            format!("{}::insert(&mut conn)", names.dao_name)
        }
    };

    writeln!(writer, "#[test]")?;
    writeln!(writer, "fn test_insert_and_load() {{")?;
    writeln!(writer, "    let mut conn = setup();")?;
    writeln!(writer, "    let inserted = {}.unwrap();", insert_call(1))?;
    writeln!(
        writer,
        "    let loaded = {}::load(&mut conn, inserted.{}).unwrap();",
        names.dao_name, id_field
    )?;
    writeln!(writer, "    assert_eq!(loaded, Some(inserted));")?;
    writeln!(writer, "    assert_eq!({}::count(&mut conn).unwrap(), 1);", names.dao_name)?;
    writeln!(writer, "}}")?;
    writeln!(writer)?;

    writeln!(writer, "#[test]")?;
    writeln!(writer, "fn test_load_all_in_identity_order() {{")?;
    writeln!(writer, "    let mut conn = setup();")?;
    writeln!(writer, "    let first = {}.unwrap();", insert_call(1))?;
    writeln!(writer, "    let second = {}.unwrap();", insert_call(2))?;
    writeln!(
        writer,
        "    assert_eq!({}::load_all(&mut conn).unwrap(), vec![first, second]);",
        names.dao_name
    )?;
    writeln!(writer, "}}")?;
    writeln!(writer)?;

    writeln!(writer, "#[test]")?;
    writeln!(writer, "fn test_delete_by_key() {{")?;
    writeln!(writer, "    let mut conn = setup();")?;
    writeln!(writer, "    let inserted = {}.unwrap();", insert_call(1))?;
    writeln!(
        writer,
        "    assert_eq!({}::delete_by_key(&mut conn, inserted.{}).unwrap(), 1);",
        names.dao_name, id_field
    )?;
    writeln!(
        writer,
        "    assert_eq!({}::load(&mut conn, inserted.{}).unwrap(), None);",
        names.dao_name, id_field
    )?;
    writeln!(writer, "}}")?;
    writeln!(writer)?;

    writeln!(writer, "#[test]")?;
    writeln!(writer, "fn test_create_table_if_not_exists() {{")?;
    writeln!(writer, "    let mut conn = setup();")?;
    writeln!(writer, "    {}::create_table(&mut conn, true).unwrap();", names.dao_name)?;
    writeln!(writer, "    {}::drop_table(&mut conn, false).unwrap();", names.dao_name)?;
    writeln!(writer, "    {}::drop_table(&mut conn, true).unwrap();", names.dao_name)?;
    writeln!(writer, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campus::campus_schema;
    use crate::schema::{EntityBuilder, PropertyBuilder, SchemaBuilder};

    #[test]
    fn test_building_dao_test() {
        let schema = campus_schema().unwrap();
        let mut out = Vec::new();
        generate_dao_test(&mut out, &schema, schema.entity("Building").unwrap()).unwrap();
        let code = String::from_utf8(out).unwrap();

        assert!(code.contains("use crate::dao::building::NewBuilding;"));
        assert!(code.contains("use crate::dao::building_dao::BuildingDao;"));
        assert!(code.contains("        built_year: 42,"));
        assert!(code.contains("        supplementary_info: Some(\"sample\".to_string()),"));
        assert!(code.contains("fn sample(_n: i32) -> NewBuilding {"));
        assert!(code.contains("let inserted = BuildingDao::insert(&mut conn, &sample(1)).unwrap();"));
        assert_eq!(code.matches("#[test]").count(), 4);
    }

    #[test]
    fn test_unique_columns_get_distinct_samples() {
        let schema = SchemaBuilder::new(1)
            .entity(
                EntityBuilder::new("Room")
                    .id_property()
                    .property(PropertyBuilder::string("type").not_null().unique())
                    .property(PropertyBuilder::int("floor").unique())
                    .property(PropertyBuilder::string("label")),
            )
            .build()
            .unwrap();
        let mut out = Vec::new();
        generate_dao_test(&mut out, &schema, schema.entity("Room").unwrap()).unwrap();
        let code = String::from_utf8(out).unwrap();

        assert!(code.contains("fn sample(n: i32) -> NewRoom {"));
        assert!(code.contains("        r#type: format!(\"sample{}\", n),"));
        assert!(code.contains("        floor: Some(n),"));
        assert!(code.contains("        label: Some(\"sample\".to_string()),"));
        assert!(code.contains("let first = RoomDao::insert(&mut conn, &sample(1)).unwrap();"));
        assert!(code.contains("let second = RoomDao::insert(&mut conn, &sample(2)).unwrap();"));
    }

    #[test]
    fn test_identity_only_entity() {
        let schema = SchemaBuilder::new(1)
            .entity(EntityBuilder::new("Marker").id_property())
            .build()
            .unwrap();
        let mut out = Vec::new();
        generate_dao_test(&mut out, &schema, schema.entity("Marker").unwrap()).unwrap();
        let code = String::from_utf8(out).unwrap();

        assert!(!code.contains("fn sample"));
        assert!(code.contains("let second = MarkerDao::insert(&mut conn).unwrap();"));
    }
}
