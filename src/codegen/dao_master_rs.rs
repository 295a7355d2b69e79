//! DAO master: schema version and whole-schema DDL.

use std::io::{self, Write};

use crate::codegen::names::EntityNames;
use crate::codegen::GENERATED_HEADER;
use crate::schema::Schema;

/// Generate `dao_master.rs`.
pub fn generate_dao_master<W: Write>(writer: &mut W, schema: &Schema) -> io::Result<()> {
    let names: Vec<EntityNames> = schema
        .entities()
        .map(|e| EntityNames::of(schema, e))
        .collect();

    writeln!(writer, "{}", GENERATED_HEADER)?;
    writeln!(writer)?;
    writeln!(writer, "use diesel::prelude::*;")?;
    writeln!(writer, "use diesel::sqlite::SqliteConnection;")?;
    writeln!(writer)?;
    for entity in &names {
        writeln!(writer, "use {}::{};", entity.dao_path, entity.dao_name)?;
    }
    writeln!(writer)?;
    writeln!(writer, "pub const SCHEMA_VERSION: i32 = {};", schema.version)?;
    writeln!(writer)?;

    writeln!(writer, "/// Creates every table, in declaration order.")?;
    writeln!(
        writer,
        "pub fn create_all_tables(conn: &mut SqliteConnection, if_not_exists: bool) -> QueryResult<()> {{"
    )?;
    writeln!(writer, "    conn.transaction(|conn| {{")?;
    for entity in &names {
        writeln!(writer, "        {}::create_table(conn, if_not_exists)?;", entity.dao_name)?;
    }
    writeln!(writer, "        Ok(())")?;
    writeln!(writer, "    }})")?;
    writeln!(writer, "}}")?;
    writeln!(writer)?;

    writeln!(writer, "/// Drops every table, in reverse declaration order.")?;
    writeln!(
        writer,
        "pub fn drop_all_tables(conn: &mut SqliteConnection, if_exists: bool) -> QueryResult<()> {{"
    )?;
    writeln!(writer, "    conn.transaction(|conn| {{")?;
    for entity in names.iter().rev() {
        writeln!(writer, "        {}::drop_table(conn, if_exists)?;", entity.dao_name)?;
    }
    writeln!(writer, "        Ok(())")?;
    writeln!(writer, "    }})")?;
    writeln!(writer, "}}")
}
