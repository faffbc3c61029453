//! DDL generation from the schema registry

use social_core::schema::registry::{CREATED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN};
use social_core::schema::{EntityKind, JoinTableDef, Registry};

use crate::errors::Result;
use crate::sync::checksums::compute_checksum;

/// Statements that create one table and its indexes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDdl {
    pub table: &'static str,
    pub sql: String,
}

impl TableDdl {
    pub fn checksum(&self) -> String {
        compute_checksum(&self.sql)
    }
}

/// Every table of the schema in creation order: entity tables by
/// dependency, then join tables
pub fn schema(registry: &Registry) -> Result<Vec<TableDdl>> {
    let mut tables = Vec::new();
    for kind in registry.table_order()? {
        tables.push(entity_table(registry, kind)?);
    }
    tables.extend(registry.join_tables().iter().map(join_table));
    Ok(tables)
}

/// `CREATE TABLE` for an entity: identity, declared fields, foreign keys
/// (`ON DELETE SET NULL`), timestamps
pub fn entity_table(registry: &Registry, kind: EntityKind) -> Result<TableDdl> {
    let def = registry.entity(kind)?;
    let table = kind.table();

    let mut columns = vec![format!("{} TEXT PRIMARY KEY", ID_COLUMN)];
    for field in &def.fields {
        let not_null = if field.nullable { "" } else { " NOT NULL" };
        columns.push(format!("{} {}{}", field.name, field.ty.sql_type(), not_null));
    }

    let foreign_keys = registry.foreign_keys_on(kind);
    for fk in &foreign_keys {
        columns.push(format!(
            "{} TEXT REFERENCES {}({}) ON DELETE SET NULL",
            fk.column,
            fk.references.table(),
            ID_COLUMN
        ));
    }
    columns.push(format!("{} INTEGER NOT NULL", CREATED_AT_COLUMN));
    columns.push(format!("{} INTEGER NOT NULL", UPDATED_AT_COLUMN));

    let mut sql = create_table(table, &columns);
    for fk in &foreign_keys {
        sql.push_str(&create_index(table, fk.column));
    }

    Ok(TableDdl { table, sql })
}

/// `CREATE TABLE` for a join table; the autoincrement id orders links
pub fn join_table(def: &JoinTableDef) -> TableDdl {
    let mut columns = vec![format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", ID_COLUMN)];
    for key in &def.keys {
        columns.push(format!(
            "{} TEXT NOT NULL REFERENCES {}({}) ON DELETE CASCADE",
            key.column,
            key.references.table(),
            ID_COLUMN
        ));
    }
    columns.push(format!("{} INTEGER NOT NULL", CREATED_AT_COLUMN));

    let mut sql = create_table(def.table, &columns);
    for key in &def.keys {
        sql.push_str(&create_index(def.table, key.column));
    }

    TableDdl {
        table: def.table,
        sql,
    }
}

fn create_table(table: &str, columns: &[String]) -> String {
    format!("CREATE TABLE {} (\n    {}\n);", table, columns.join(",\n    "))
}

fn create_index(table: &str, column: &str) -> String {
    format!(
        "\nCREATE INDEX idx_{table}_{column} ON {table}({column});",
        table = table,
        column = column
    )
}
