//! SQLite DDL derived from the schema model.

use crate::schema::{Entity, Property};

/// Column definition inside `CREATE TABLE`.
pub fn column_definition(property: &Property) -> String {
    let mut definition = format!("\"{}\" {}", property.column_name, property.property_type.sql_type());

    if property.primary_key {
        definition.push_str(" PRIMARY KEY");
        if property.autoincrement {
            definition.push_str(" AUTOINCREMENT");
        }
    } else if property.not_null {
        definition.push_str(" NOT NULL");
    }
    if property.unique && !property.primary_key {
        definition.push_str(" UNIQUE");
    }

    definition
}

pub fn create_table_sql(entity: &Entity, if_not_exists: bool) -> String {
    let columns: Vec<String> = entity.properties.iter().map(column_definition).collect();
    format!(
        "CREATE TABLE {}\"{}\" ({});",
        if if_not_exists { "IF NOT EXISTS " } else { "" },
        entity.table_name,
        columns.join(", ")
    )
}

pub fn drop_table_sql(entity: &Entity, if_exists: bool) -> String {
    format!(
        "DROP TABLE {}\"{}\";",
        if if_exists { "IF EXISTS " } else { "" },
        entity.table_name
    )
}

/// One `CREATE INDEX` statement per indexed property.
pub fn create_index_sql(entity: &Entity) -> Vec<String> {
    entity
        .properties
        .iter()
        .filter(|p| p.index && !p.primary_key)
        .map(|p| {
            format!(
                "CREATE INDEX IF NOT EXISTS \"IDX_{}_{}\" ON \"{}\" (\"{}\");",
                entity.table_name, p.column_name, entity.table_name, p.column_name
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntityBuilder, PropertyBuilder, SchemaBuilder};

    fn library() -> Entity {
        let schema = SchemaBuilder::new(1)
            .entity(
                EntityBuilder::new("Library")
                    .id_property()
                    .property(PropertyBuilder::string("name").not_null().unique())
                    .property(PropertyBuilder::string("room"))
                    .property(PropertyBuilder::long("buildingId").not_null().index()),
            )
            .build()
            .unwrap();
        schema.entity("Library").unwrap().clone()
    }

    #[test]
    fn test_create_table() {
        assert_eq!(
            create_table_sql(&library(), false),
            "CREATE TABLE \"LIBRARY\" (\"_id\" INTEGER PRIMARY KEY, \"NAME\" TEXT NOT NULL UNIQUE, \
             \"ROOM\" TEXT, \"BUILDING_ID\" INTEGER NOT NULL);"
        );
        assert!(create_table_sql(&library(), true).starts_with("CREATE TABLE IF NOT EXISTS \"LIBRARY\""));
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(drop_table_sql(&library(), true), "DROP TABLE IF EXISTS \"LIBRARY\";");
        assert_eq!(drop_table_sql(&library(), false), "DROP TABLE \"LIBRARY\";");
    }

    #[test]
    fn test_index() {
        assert_eq!(
            create_index_sql(&library()),
            vec!["CREATE INDEX IF NOT EXISTS \"IDX_LIBRARY_BUILDING_ID\" ON \"LIBRARY\" (\"BUILDING_ID\");"]
        );
    }

    #[test]
    fn test_autoincrement() {
        let id = PropertyBuilder::id().autoincrement();
        let schema = SchemaBuilder::new(1)
            .entity(EntityBuilder::new("Faculty").property(id))
            .build()
            .unwrap();
        let faculty = schema.entity("Faculty").unwrap();
        assert_eq!(
            column_definition(faculty.id_property().unwrap()),
            "\"_id\" INTEGER PRIMARY KEY AUTOINCREMENT"
        );
    }
}
