//! DAO generation: table DDL plus CRUD and relationship queries per entity.

use std::io::{self, Write};

use crate::codegen::names::{field_name, id_property, to_many_query_name, EntityNames};
use crate::codegen::sql;
use crate::codegen::GENERATED_HEADER;
use crate::schema::{Entity, Schema};

/// Generate the DAO module of one entity.
pub fn generate_dao<W: Write>(writer: &mut W, schema: &Schema, entity: &Entity) -> io::Result<()> {
    let names = EntityNames::of(schema, entity);
    let table = names.table();
    let id_field = field_name(&id_property(entity)?.name);
    let has_data = entity.data_properties().next().is_some();
    let incoming: Vec<_> = schema.incoming_to_manys(&entity.name).collect();

    writeln!(writer, "{}", GENERATED_HEADER)?;
    writeln!(writer)?;
    writeln!(writer, "use diesel::prelude::*;")?;
    writeln!(writer, "use diesel::sqlite::SqliteConnection;")?;
    writeln!(writer)?;
    if has_data {
        writeln!(
            writer,
            "use {}::{{{}, {}}};",
            names.entity_path, names.struct_name, names.new_struct_name
        )?;
    } else {
        writeln!(writer, "use {}::{};", names.entity_path, names.struct_name)?;
    }
    writeln!(writer, "use {};", names.schema_path)?;
    writeln!(writer)?;

    writeln!(
        writer,
        "/// Data access for [`{}`] rows stored in table `{}`.",
        names.struct_name, entity.table_name
    )?;
    writeln!(writer, "pub struct {};", names.dao_name)?;
    writeln!(writer)?;
    writeln!(writer, "impl {} {{", names.dao_name)?;

    // Constants
    writeln!(writer, "    pub const TABLENAME: &'static str = {:?};", entity.table_name)?;
    writeln!(writer)?;
    writeln!(writer, "    /// Column names in table order.")?;
    writeln!(writer, "    pub const COLUMNS: &'static [&'static str] = &[")?;
    for property in &entity.properties {
        writeln!(writer, "        {:?},", property.column_name)?;
    }
    writeln!(writer, "    ];")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "    const CREATE_TABLE: &'static str = {:?};",
        sql::create_table_sql(entity, false)
    )?;
    writeln!(
        writer,
        "    const CREATE_TABLE_IF_NOT_EXISTS: &'static str = {:?};",
        sql::create_table_sql(entity, true)
    )?;
    writeln!(writer, "    const DROP_TABLE: &'static str = {:?};", sql::drop_table_sql(entity, false))?;
    writeln!(
        writer,
        "    const DROP_TABLE_IF_EXISTS: &'static str = {:?};",
        sql::drop_table_sql(entity, true)
    )?;
    let indexes = sql::create_index_sql(entity);
    if indexes.is_empty() {
        writeln!(writer, "    const CREATE_INDEXES: &'static [&'static str] = &[];")?;
    } else {
        writeln!(writer, "    const CREATE_INDEXES: &'static [&'static str] = &[")?;
        for index in &indexes {
            writeln!(writer, "        {:?},", index)?;
        }
        writeln!(writer, "    ];")?;
    }
    writeln!(writer)?;

    // DDL
    writeln!(writer, "    /// Creates the table and its indexes.")?;
    writeln!(
        writer,
        "    pub fn create_table(conn: &mut SqliteConnection, if_not_exists: bool) -> QueryResult<()> {{"
    )?;
    writeln!(
        writer,
        "        let sql = if if_not_exists {{ Self::CREATE_TABLE_IF_NOT_EXISTS }} else {{ Self::CREATE_TABLE }};"
    )?;
    writeln!(writer, "        diesel::sql_query(sql).execute(conn)?;")?;
    writeln!(writer, "        for index in Self::CREATE_INDEXES {{")?;
    writeln!(writer, "            diesel::sql_query(*index).execute(conn)?;")?;
    writeln!(writer, "        }}")?;
    writeln!(writer, "        Ok(())")?;
    writeln!(writer, "    }}")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "    pub fn drop_table(conn: &mut SqliteConnection, if_exists: bool) -> QueryResult<()> {{"
    )?;
    writeln!(
        writer,
        "        let sql = if if_exists {{ Self::DROP_TABLE_IF_EXISTS }} else {{ Self::DROP_TABLE }};"
    )?;
    writeln!(writer, "        diesel::sql_query(sql).execute(conn)?;")?;
    writeln!(writer, "        Ok(())")?;
    writeln!(writer, "    }}")?;
    writeln!(writer)?;

    // CRUD
    writeln!(writer, "    /// Inserts a row and returns it with its assigned identity.")?;
    if has_data {
        writeln!(
            writer,
            "    pub fn insert(conn: &mut SqliteConnection, entity: &{}) -> QueryResult<{}> {{",
            names.new_struct_name, names.struct_name
        )?;
        writeln!(writer, "        conn.transaction(|conn| {{")?;
        writeln!(
            writer,
            "            diesel::insert_into({}::table).values(entity).execute(conn)?;",
            table
        )?;
    } else {
        writeln!(
            writer,
            "    pub fn insert(conn: &mut SqliteConnection) -> QueryResult<{}> {{",
            names.struct_name
        )?;
        writeln!(writer, "        conn.transaction(|conn| {{")?;
        writeln!(
            writer,
            "            diesel::insert_into({}::table).default_values().execute(conn)?;",
            table
        )?;
    }
    writeln!(writer, "            {}::table", table)?;
    writeln!(writer, "                .order({}::{}.desc())", table, id_field)?;
    writeln!(writer, "                .select({}::as_select())", names.struct_name)?;
    writeln!(writer, "                .first(conn)")?;
    writeln!(writer, "        }})")?;
    writeln!(writer, "    }}")?;
    writeln!(writer)?;

    writeln!(
        writer,
        "    pub fn load(conn: &mut SqliteConnection, key: i64) -> QueryResult<Option<{}>> {{",
        names.struct_name
    )?;
    writeln!(writer, "        {}::table", table)?;
    writeln!(writer, "            .find(key)")?;
    writeln!(writer, "            .select({}::as_select())", names.struct_name)?;
    writeln!(writer, "            .first(conn)")?;
    writeln!(writer, "            .optional()")?;
    writeln!(writer, "    }}")?;
    writeln!(writer)?;

    writeln!(
        writer,
        "    pub fn load_all(conn: &mut SqliteConnection) -> QueryResult<Vec<{}>> {{",
        names.struct_name
    )?;
    writeln!(writer, "        {}::table", table)?;
    writeln!(writer, "            .order({}::{}.asc())", table, id_field)?;
    writeln!(writer, "            .select({}::as_select())", names.struct_name)?;
    writeln!(writer, "            .load(conn)")?;
    writeln!(writer, "    }}")?;
    writeln!(writer)?;

    if has_data {
        writeln!(writer, "    /// Writes every column of `entity`, matched by identity.")?;
        writeln!(
            writer,
            "    pub fn update(conn: &mut SqliteConnection, entity: &{}) -> QueryResult<usize> {{",
            names.struct_name
        )?;
        writeln!(writer, "        diesel::update(entity).set(entity).execute(conn)")?;
        writeln!(writer, "    }}")?;
        writeln!(writer)?;
    }

    writeln!(
        writer,
        "    pub fn delete_by_key(conn: &mut SqliteConnection, key: i64) -> QueryResult<usize> {{"
    )?;
    writeln!(writer, "        diesel::delete({}::table.find(key)).execute(conn)", table)?;
    writeln!(writer, "    }}")?;
    writeln!(writer)?;
    writeln!(writer, "    pub fn delete_all(conn: &mut SqliteConnection) -> QueryResult<usize> {{")?;
    writeln!(writer, "        diesel::delete({}::table).execute(conn)", table)?;
    writeln!(writer, "    }}")?;
    writeln!(writer)?;
    writeln!(writer, "    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {{")?;
    writeln!(writer, "        {}::table.count().get_result(conn)", table)?;
    writeln!(writer, "    }}")?;

    // Queries backing to-many accessors of other entities
    for (owner, to_many) in incoming {
        let fk = field_name(&to_many.target_property);
        writeln!(writer)?;
        writeln!(
            writer,
            "    /// Rows backing [`{}::{}`](crate::{}::{}::{}::{}).",
            owner.name,
            field_name(&to_many.name),
            schema.modules.default_module,
            crate::codegen::utils::to_snake_case(&owner.name),
            owner.name,
            field_name(&to_many.name)
        )?;
        writeln!(
            writer,
            "    pub fn {}(conn: &mut SqliteConnection, {}: i64) -> QueryResult<Vec<{}>> {{",
            to_many_query_name(owner, to_many),
            fk,
            names.struct_name
        )?;
        writeln!(writer, "        {}::table", table)?;
        writeln!(writer, "            .filter({}::{}.eq({}))", table, fk, fk)?;
        for (i, term) in to_many.order.iter().enumerate() {
            let method = if i == 0 { "order_by" } else { "then_order_by" };
            writeln!(
                writer,
                "            .{}({}::{}.{}())",
                method,
                table,
                field_name(&term.property),
                term.direction.as_method()
            )?;
        }
        writeln!(writer, "            .select({}::as_select())", names.struct_name)?;
        writeln!(writer, "            .load(conn)")?;
        writeln!(writer, "    }}")?;
    }

    writeln!(writer, "}}")
}
