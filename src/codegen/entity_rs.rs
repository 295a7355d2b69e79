//! Entity struct generation.
//!
//! Each entity gets a Diesel model struct, an insertable `New*` struct without
//! the identity, and accessor methods for its relationships.

use std::collections::BTreeSet;
use std::io::{self, Write};

use crate::codegen::keep_sections;
use crate::codegen::names::{field_name, id_property, to_many_query_name, EntityNames};
use crate::codegen::GENERATED_HEADER;
use crate::schema::{Direction, Entity, Schema};

/// Generate the module of one entity.
pub fn generate_entity<W: Write>(writer: &mut W, schema: &Schema, entity: &Entity) -> io::Result<()> {
    let names = EntityNames::of(schema, entity);
    let has_relations = !entity.to_ones.is_empty() || !entity.to_manys.is_empty();
    let has_data = entity.data_properties().next().is_some();
    let id_field = field_name(&id_property(entity)?.name);

    writeln!(writer, "{}", GENERATED_HEADER)?;
    writeln!(writer)?;
    writeln!(writer, "use diesel::prelude::*;")?;
    if has_relations {
        writeln!(writer, "use diesel::sqlite::SqliteConnection;")?;
    }
    writeln!(writer)?;

    let mut imports = BTreeSet::new();
    imports.insert(format!("use {};", names.schema_path));
    for to_one in &entity.to_ones {
        if let Some(target) = schema.entity(&to_one.target) {
            let target_names = EntityNames::of(schema, target);
            if target.name != entity.name {
                imports.insert(format!("use {}::{};", target_names.entity_path, target.name));
            }
        }
    }
    for to_many in &entity.to_manys {
        if let Some(target) = schema.entity(&to_many.target) {
            let target_names = EntityNames::of(schema, target);
            if target.name != entity.name {
                imports.insert(format!("use {}::{};", target_names.entity_path, target.name));
            }
            imports.insert(format!("use {}::{};", target_names.dao_path, target_names.dao_name));
        }
    }
    for import in &imports {
        writeln!(writer, "{}", import)?;
    }

    if schema.keep_sections {
        writeln!(writer)?;
        keep_sections::write_region(writer, "", keep_sections::INCLUDES)?;
    }
    writeln!(writer)?;

    generate_model_struct(writer, entity, &names, &id_field, has_data)?;
    if has_data {
        writeln!(writer)?;
        generate_new_struct(writer, entity, &names)?;
    }

    if has_relations || schema.keep_sections {
        writeln!(writer)?;
        writeln!(writer, "impl {} {{", names.struct_name)?;
        let mut first = true;
        for to_one in &entity.to_ones {
            if !first {
                writeln!(writer)?;
            }
            first = false;
            let target_names = match schema.entity(&to_one.target) {
                Some(target) => EntityNames::of(schema, target),
                None => continue,
            };
            let fk = field_name(&to_one.fk_property);
            writeln!(writer, "    /// Loads the [`{}`] referenced by `{}`.", to_one.target, fk)?;
            writeln!(
                writer,
                "    pub fn {}(&self, conn: &mut SqliteConnection) -> QueryResult<{}> {{",
                field_name(&to_one.name),
                to_one.target
            )?;
            writeln!(writer, "        {}::table", target_names.table())?;
            writeln!(writer, "            .find(self.{})", fk)?;
            writeln!(writer, "            .select({}::as_select())", to_one.target)?;
            writeln!(writer, "            .first(conn)")?;
            writeln!(writer, "    }}")?;
        }

        for to_many in &entity.to_manys {
            if !first {
                writeln!(writer)?;
            }
            first = false;
            let target_names = match schema.entity(&to_many.target) {
                Some(target) => EntityNames::of(schema, target),
                None => continue,
            };
            let ordering: Vec<String> = to_many
                .order
                .iter()
                .map(|term| {
                    let direction = match term.direction {
                        Direction::Asc => "ascending",
                        Direction::Desc => "descending",
                    };
                    format!("`{}` {}", field_name(&term.property), direction)
                })
                .collect();

            write!(
                writer,
                "    /// Loads the [`{}`] rows whose `{}` references this row",
                to_many.target,
                field_name(&to_many.target_property)
            )?;
            if ordering.is_empty() {
                writeln!(writer, ".")?;
            } else {
                writeln!(writer, ", ordered by {}.", ordering.join(", then "))?;
            }
            writeln!(
                writer,
                "    pub fn {}(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<{}>> {{",
                field_name(&to_many.name),
                to_many.target
            )?;
            writeln!(
                writer,
                "        {}::{}(conn, self.{})",
                target_names.dao_name,
                to_many_query_name(entity, to_many),
                id_field
            )?;
            writeln!(writer, "    }}")?;
        }

        if schema.keep_sections {
            if !first {
                writeln!(writer)?;
            }
            keep_sections::write_region(writer, "    ", keep_sections::METHODS)?;
        }
        writeln!(writer, "}}")?;
    }

    if schema.keep_sections {
        writeln!(writer)?;
        keep_sections::write_region(writer, "", keep_sections::ITEMS)?;
    }

    Ok(())
}

fn generate_model_struct<W: Write>(
    writer: &mut W,
    entity: &Entity,
    names: &EntityNames,
    id_field: &str,
    has_data: bool,
) -> io::Result<()> {
    writeln!(writer, "/// Entity mapped to table `{}`.", entity.table_name)?;
    if has_data {
        writeln!(
            writer,
            "#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, AsChangeset)]"
        )?;
    } else {
        writeln!(writer, "#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]")?;
    }
    writeln!(writer, "#[diesel(table_name = {})]", names.table())?;
    if id_field != "id" {
        writeln!(writer, "#[diesel(primary_key({}))]", id_field)?;
    }
    if has_data && entity.data_properties().any(|p| p.is_optional()) {
        writeln!(writer, "#[diesel(treat_none_as_null = true)]")?;
    }
    writeln!(writer, "#[diesel(check_for_backend(diesel::sqlite::Sqlite))]")?;
    writeln!(writer, "pub struct {} {{", names.struct_name)?;
    for property in &entity.properties {
        if let Some(ref doc) = property.doc {
            writeln!(writer, "    /// {}", doc)?;
        }
        writeln!(
            writer,
            "    pub {}: {},",
            field_name(&property.name),
            property.rust_field_type()
        )?;
    }
    writeln!(writer, "}}")
}

fn generate_new_struct<W: Write>(writer: &mut W, entity: &Entity, names: &EntityNames) -> io::Result<()> {
    writeln!(
        writer,
        "/// Insertable form of [`{}`]; the identity is assigned by the database.",
        names.struct_name
    )?;
    writeln!(writer, "#[derive(Debug, Clone, PartialEq, Insertable)]")?;
    writeln!(writer, "#[diesel(table_name = {})]", names.table())?;
    writeln!(writer, "pub struct {} {{", names.new_struct_name)?;
    for property in entity.data_properties() {
        writeln!(
            writer,
            "    pub {}: {},",
            field_name(&property.name),
            property.rust_field_type()
        )?;
    }
    writeln!(writer, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campus::campus_schema;

    fn render(name: &str) -> String {
        let schema = campus_schema().unwrap();
        let mut out = Vec::new();
        generate_entity(&mut out, &schema, schema.entity(name).unwrap()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_building_struct() {
        let code = render("Building");

        assert!(code.contains("pub struct Building {"));
        assert!(code.contains("    pub id: i64,"));
        assert!(code.contains("    pub location_id: i64,"));
        assert!(code.contains("    pub built_year: i32,"));
        assert!(code.contains("    pub supplementary_info: Option<String>,"));
        assert!(code.contains("#[diesel(table_name = schema::building)]"));
        assert!(code.contains("#[diesel(treat_none_as_null = true)]"));

        let new_struct = code.split("pub struct NewBuilding {").nth(1).unwrap();
        assert!(!new_struct.split('}').next().unwrap().contains("pub id:"));
    }

    #[test]
    fn test_building_relations() {
        let code = render("Building");

        assert!(code.contains("use crate::dao::location::Location;"));
        assert!(code.contains("use crate::dao::department_dao::DepartmentDao;"));
        assert!(code.contains("pub fn location(&self, conn: &mut SqliteConnection) -> QueryResult<Location> {"));
        assert!(code.contains(".find(self.location_id)"));
        assert!(code.contains(
            "pub fn departments(&self, conn: &mut SqliteConnection) -> QueryResult<Vec<Department>> {"
        ));
        assert!(code.contains("DepartmentDao::query_building_departments(conn, self.id)"));
        assert!(code.contains("ordered by `name` ascending."));
    }

    #[test]
    fn test_keep_regions_present() {
        let code = render("Faculty");
        assert!(code.contains("// KEEP INCLUDES - put your custom includes here"));
        assert!(code.contains("    // KEEP METHODS - put your custom methods here"));
        assert!(code.contains("// KEEP ITEMS END"));
        assert!(!code.contains("SqliteConnection"));
    }
}
