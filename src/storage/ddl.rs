//! Index storage DDL
//!
//! Renders `CREATE TABLE` / `CREATE INDEX` statements for a structure's tables with
//! sea-query. Only dialects with a sea-query schema backend are supported.

use super::{
    shared_value_column, IndexStorageLayout, StorageNames, JSON, MEMBER_PATH,
    STRUCTURE_ID, UNIQUE_VALUE, VALUE,
};
use crate::error::{StructuraError, StructuraResult};
use crate::schema::{DataTypeCode, StructureSchema};
use crate::sql::Dialect;
use sea_query::{Alias, ColumnDef, Index, IndexCreateStatement, Table, TableCreateStatement};
use std::collections::BTreeMap;

/// Length of string index values and member paths
pub const STRING_VALUE_LENGTH: u32 = 300;

const SHARED_CATEGORIES: [DataTypeCode; 7] = [
    DataTypeCode::Integer,
    DataTypeCode::Fractal,
    DataTypeCode::Boolean,
    DataTypeCode::DateTime,
    DataTypeCode::Guid,
    DataTypeCode::String,
    DataTypeCode::Text,
];

/// Statements creating the structure table, index storage and (if needed) uniques table
///
/// # Errors
///
/// `UnsupportedDialect` for the SQL Server dialects.
pub fn create_statements(
    schema: &StructureSchema,
    layout: IndexStorageLayout,
    dialect: Dialect,
) -> StructuraResult<Vec<String>> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("create_statements", structure = schema.name(), %dialect).entered();

    if !matches!(dialect, Dialect::Postgres | Dialect::Sqlite) {
        return Err(StructuraError::UnsupportedDialect {
            dialect: dialect.to_string(),
            feature: "index storage DDL".to_string(),
        });
    }

    let names = StorageNames::new(schema.name());
    let id_type = schema
        .id_member()
        .map(|m| m.data_type)
        .unwrap_or(DataTypeCode::Guid);

    let mut statements = vec![render_table(dialect, &structure_table(&names, id_type))];

    match layout {
        IndexStorageLayout::Narrow => {
            let tables: BTreeMap<String, DataTypeCode> = schema
                .members()
                .iter()
                .map(|m| (names.index_table(layout, m.data_type), storage_category(m.data_type)))
                .collect();
            for (table, data_type) in tables {
                statements.push(render_table(dialect, &narrow_table(&table, id_type, data_type)));
                statements.push(render_index(dialect, &index(&table, &[STRUCTURE_ID], false)));
                if data_type != DataTypeCode::Text {
                    statements.push(render_index(dialect, &index(&table, &[MEMBER_PATH, VALUE], false)));
                }
            }
        }
        IndexStorageLayout::Shared => {
            let table = names.shared_index_table();
            statements.push(render_table(dialect, &shared_table(&table, id_type)));
            statements.push(render_index(
                dialect,
                &index(&table, &[STRUCTURE_ID, MEMBER_PATH], false),
            ));
        }
    }

    if !schema.unique_constraints().is_empty() {
        let table = names.uniques_table();
        statements.push(render_table(dialect, &uniques_table(&table, id_type)));
        statements.push(render_index(
            dialect,
            &index(&table, &[MEMBER_PATH, UNIQUE_VALUE], true),
        ));
    }

    log::debug!(
        "Rendered {} {dialect} DDL statement(s) for '{}'",
        statements.len(),
        schema.name()
    );
    Ok(statements)
}

/// Categories sharing a narrow table also share its column type
fn storage_category(data_type: DataTypeCode) -> DataTypeCode {
    match data_type {
        DataTypeCode::UnsignedInteger => DataTypeCode::Integer,
        DataTypeCode::Enum => DataTypeCode::String,
        other => other,
    }
}

fn typed_column(name: &'static str, data_type: DataTypeCode) -> ColumnDef {
    let mut def = ColumnDef::new(name);
    match data_type {
        DataTypeCode::Integer | DataTypeCode::UnsignedInteger => def.big_integer(),
        DataTypeCode::Fractal => def.double(),
        DataTypeCode::Boolean => def.boolean(),
        DataTypeCode::DateTime => def.timestamp(),
        DataTypeCode::Guid => def.uuid(),
        DataTypeCode::String | DataTypeCode::Enum => def.string().string_len(STRING_VALUE_LENGTH),
        DataTypeCode::Text => def.text(),
    };
    def
}

fn structure_table(names: &StorageNames, id_type: DataTypeCode) -> TableCreateStatement {
    Table::create()
        .table(names.structure_table())
        .if_not_exists()
        .col(typed_column(STRUCTURE_ID, id_type).not_null().primary_key())
        .col(ColumnDef::new(JSON).text().not_null())
        .to_owned()
}

fn narrow_table(table: &str, id_type: DataTypeCode, data_type: DataTypeCode) -> TableCreateStatement {
    Table::create()
        .table(table.to_string())
        .if_not_exists()
        .col(typed_column(STRUCTURE_ID, id_type).not_null())
        .col(
            ColumnDef::new(MEMBER_PATH)
                .string()
                .string_len(STRING_VALUE_LENGTH)
                .not_null(),
        )
        .col(typed_column(VALUE, data_type).null())
        .to_owned()
}

fn shared_table(table: &str, id_type: DataTypeCode) -> TableCreateStatement {
    let mut statement = Table::create();
    statement
        .table(table.to_string())
        .if_not_exists()
        .col(typed_column(STRUCTURE_ID, id_type).not_null())
        .col(
            ColumnDef::new(MEMBER_PATH)
                .string()
                .string_len(STRING_VALUE_LENGTH)
                .not_null(),
        );
    for data_type in SHARED_CATEGORIES {
        statement.col(typed_column(shared_value_column(data_type), data_type).null());
    }
    statement.to_owned()
}

fn uniques_table(table: &str, id_type: DataTypeCode) -> TableCreateStatement {
    Table::create()
        .table(table.to_string())
        .if_not_exists()
        .col(typed_column(STRUCTURE_ID, id_type).not_null())
        .col(
            ColumnDef::new(MEMBER_PATH)
                .string()
                .string_len(STRING_VALUE_LENGTH)
                .not_null(),
        )
        .col(
            ColumnDef::new(UNIQUE_VALUE)
                .string()
                .string_len(STRING_VALUE_LENGTH)
                .not_null(),
        )
        .to_owned()
}

fn index(table: &str, columns: &[&'static str], unique: bool) -> IndexCreateStatement {
    let mut statement = Index::create();
    statement
        .name(format!("IX_{table}_{}", columns.join("_")))
        .table(table.to_string())
        .if_not_exists();
    for column in columns {
        statement.col(Alias::new(*column));
    }
    if unique {
        statement.unique();
    }
    statement.to_owned()
}

fn render_table(dialect: Dialect, statement: &TableCreateStatement) -> String {
    match dialect {
        Dialect::Sqlite => statement.build(sea_query::SqliteQueryBuilder),
        _ => statement.build(sea_query::PostgresQueryBuilder),
    }
}

fn render_index(dialect: Dialect, statement: &IndexCreateStatement) -> String {
    match dialect {
        Dialect::Sqlite => statement.build(sea_query::SqliteQueryBuilder),
        _ => statement.build(sea_query::PostgresQueryBuilder),
    }
}

/// Index storage tables `schema` needs under `layout`, sorted by name
pub fn index_tables(schema: &StructureSchema, layout: IndexStorageLayout) -> Vec<String> {
    let names = StorageNames::new(schema.name());
    let mut tables: Vec<String> = schema
        .members()
        .iter()
        .map(|m| names.index_table(layout, m.data_type))
        .collect();
    tables.sort();
    tables.dedup();
    tables
}
