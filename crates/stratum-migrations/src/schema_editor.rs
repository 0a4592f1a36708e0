//! Schema editors: dialect-specific SQL rendering.
//!
//! The [`SchemaEditor`] trait translates operation payloads into SQL for one
//! database dialect. Methods return `Vec<String>` because some changes take
//! multiple statements. The provided [`SchemaEditor::render`] method is the
//! single entry point the executor uses; it dispatches on
//! [`OperationKind`] and pairs statements with their bind parameters.

use stratum_core::{StratumError, StratumResult};
use stratum_db::Value;

use crate::operation::{
    ColumnSpec, ColumnType, ForeignKeySpec, Guard, IndexSpec, OperationKind, TableSpec,
};

/// One renderable statement: SQL text plus bind parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    /// The SQL text.
    pub sql: String,
    /// Positional bind parameters.
    pub params: Vec<Value>,
}

impl SqlStatement {
    /// A statement with no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// A statement with bind parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Renders operation payloads as SQL for one dialect.
pub trait SchemaEditor: Send + Sync {
    /// The vendor this editor targets ("sqlite", "postgresql").
    fn vendor(&self) -> &'static str;

    /// The SQL fragment for a column definition (type and constraints).
    fn column_sql(&self, column: &ColumnSpec) -> String;

    /// `CREATE TABLE` DDL, including table-level foreign keys.
    fn create_table(&self, table: &TableSpec) -> Vec<String>;

    /// `DROP TABLE` DDL.
    fn drop_table(&self, table_name: &str) -> Vec<String>;

    /// `ALTER TABLE ... ADD COLUMN` DDL.
    fn add_column(&self, table_name: &str, column: &ColumnSpec) -> Vec<String>;

    /// `ALTER TABLE ... DROP COLUMN` DDL.
    fn drop_column(&self, table_name: &str, column_name: &str) -> Vec<String>;

    /// DDL to change a column's type, nullability, or default.
    fn alter_column(
        &self,
        table_name: &str,
        from: &ColumnSpec,
        to: &ColumnSpec,
    ) -> StratumResult<Vec<String>>;

    /// `CREATE INDEX` DDL.
    fn create_index(&self, index: &IndexSpec) -> Vec<String>;

    /// `DROP INDEX` DDL.
    fn drop_index(&self, index: &IndexSpec) -> Vec<String>;

    /// DDL to add a foreign key to an existing table.
    fn add_foreign_key(&self, fk: &ForeignKeySpec) -> StratumResult<Vec<String>>;

    /// DDL to drop a foreign key from an existing table.
    fn drop_foreign_key(&self, fk: &ForeignKeySpec) -> StratumResult<Vec<String>>;

    /// The positional placeholder for parameter `n` (1-based).
    fn placeholder(&self, n: usize) -> String;

    /// A NULL-safe equality predicate against parameter `n` (1-based).
    fn null_safe_eq(&self, column: &str, n: usize) -> String;

    /// A query returning at least one row iff the guarded object exists.
    fn guard_query(&self, guard: &Guard) -> (String, Vec<Value>);

    /// A parameterized single-row INSERT statement.
    fn insert_row_sql(&self, table: &str, columns: &[String]) -> String {
        let cols: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
        let placeholders: Vec<String> = (1..=columns.len())
            .map(|n| self.placeholder(n))
            .collect();
        format!(
            "INSERT INTO \"{table}\" ({}) VALUES ({})",
            cols.join(", "),
            placeholders.join(", ")
        )
    }

    /// A parameterized DELETE matching one seeded row by value.
    fn delete_row_sql(&self, table: &str, columns: &[String]) -> String {
        let predicates: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| self.null_safe_eq(c, i + 1))
            .collect();
        format!(
            "DELETE FROM \"{table}\" WHERE {}",
            predicates.join(" AND ")
        )
    }

    /// Renders an operation kind into executable statements.
    fn render(&self, kind: &OperationKind) -> StratumResult<Vec<SqlStatement>> {
        let statements = match kind {
            OperationKind::CreateTable { table } => self
                .create_table(table)
                .into_iter()
                .map(SqlStatement::new)
                .collect(),
            OperationKind::DropTable { table } => self
                .drop_table(&table.name)
                .into_iter()
                .map(SqlStatement::new)
                .collect(),
            OperationKind::AddColumn { table, column } => self
                .add_column(table, column)
                .into_iter()
                .map(SqlStatement::new)
                .collect(),
            OperationKind::DropColumn { table, column } => self
                .drop_column(table, &column.name)
                .into_iter()
                .map(SqlStatement::new)
                .collect(),
            OperationKind::AlterColumn { table, from, to } => self
                .alter_column(table, from, to)?
                .into_iter()
                .map(SqlStatement::new)
                .collect(),
            OperationKind::CreateIndex { index } => self
                .create_index(index)
                .into_iter()
                .map(SqlStatement::new)
                .collect(),
            OperationKind::DropIndex { index } => self
                .drop_index(index)
                .into_iter()
                .map(SqlStatement::new)
                .collect(),
            OperationKind::AddForeignKey { foreign_key } => self
                .add_foreign_key(foreign_key)?
                .into_iter()
                .map(SqlStatement::new)
                .collect(),
            OperationKind::DropForeignKey { foreign_key } => self
                .drop_foreign_key(foreign_key)?
                .into_iter()
                .map(SqlStatement::new)
                .collect(),
            OperationKind::InsertRows {
                table,
                columns,
                rows,
            } => {
                let sql = self.insert_row_sql(table, columns);
                rows.iter()
                    .map(|row| SqlStatement::with_params(sql.clone(), row.clone()))
                    .collect()
            }
            OperationKind::DeleteRows {
                table,
                columns,
                rows,
            } => {
                let sql = self.delete_row_sql(table, columns);
                rows.iter()
                    .map(|row| SqlStatement::with_params(sql.clone(), row.clone()))
                    .collect()
            }
            OperationKind::RawStatement { up_sql, .. } => vec![SqlStatement::new(up_sql.clone())],
        };
        Ok(statements)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// The DEFAULT clause fragment for a column, if one is declared.
fn default_sql(column: &ColumnSpec) -> String {
    match &column.default {
        Some(Value::Null) => " DEFAULT NULL".to_string(),
        Some(Value::Bool(b)) => format!(" DEFAULT {}", if *b { "TRUE" } else { "FALSE" }),
        Some(Value::Int(i)) => format!(" DEFAULT {i}"),
        Some(Value::Float(f)) => format!(" DEFAULT {f}"),
        Some(Value::String(s)) => format!(" DEFAULT '{}'", s.replace('\'', "''")),
        Some(_) => String::new(),
        None => String::new(),
    }
}

/// Maps a portable [`ColumnType`] to its native PostgreSQL type.
fn pg_type_sql(col_type: &ColumnType) -> String {
    match col_type {
        ColumnType::BigSerial => "BIGSERIAL".to_string(),
        ColumnType::Integer => "INTEGER".to_string(),
        ColumnType::BigInt => "BIGINT".to_string(),
        ColumnType::Float => "DOUBLE PRECISION".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::VarChar { max_length } => format!("VARCHAR({max_length})"),
        ColumnType::Timestamp => "TIMESTAMPTZ".to_string(),
        ColumnType::Blob => "BYTEA".to_string(),
    }
}

/// The table-level FOREIGN KEY clause for a constraint.
fn foreign_key_clause(fk: &ForeignKeySpec) -> String {
    let cols: Vec<String> = fk.columns.iter().map(|c| format!("\"{c}\"")).collect();
    let ref_cols: Vec<String> = fk.ref_columns.iter().map(|c| format!("\"{c}\"")).collect();
    format!(
        "CONSTRAINT \"{}\" FOREIGN KEY ({}) REFERENCES \"{}\" ({}) ON DELETE {}",
        fk.name,
        cols.join(", "),
        fk.ref_table,
        ref_cols.join(", "),
        fk.on_delete.as_sql()
    )
}

// ── SQLite ───────────────────────────────────────────────────────────────

/// Schema editor for SQLite.
///
/// SQLite's `ALTER TABLE` is limited: columns cannot be altered in place and
/// foreign keys cannot be added to or dropped from an existing table. Those
/// operations are rejected with a clear error instead of rendering DDL that
/// the engine would half-apply.
pub struct SqliteSchemaEditor;

impl SchemaEditor for SqliteSchemaEditor {
    fn vendor(&self) -> &'static str {
        "sqlite"
    }

    fn column_sql(&self, column: &ColumnSpec) -> String {
        if column.col_type == ColumnType::BigSerial {
            // Rowid alias; implies the primary key.
            return "INTEGER PRIMARY KEY AUTOINCREMENT".to_string();
        }
        let type_str = match &column.col_type {
            ColumnType::BigSerial => unreachable!(),
            ColumnType::Integer | ColumnType::BigInt => "INTEGER",
            ColumnType::Float => "REAL",
            ColumnType::Boolean => "INTEGER",
            ColumnType::Text | ColumnType::VarChar { .. } | ColumnType::Timestamp => "TEXT",
            ColumnType::Blob => "BLOB",
        };
        let constraint_str = if column.primary_key {
            " PRIMARY KEY"
        } else if column.nullable {
            " NULL"
        } else {
            " NOT NULL"
        };
        let unique_str = if column.unique && !column.primary_key {
            " UNIQUE"
        } else {
            ""
        };
        format!("{type_str}{constraint_str}{unique_str}{}", default_sql(column))
    }

    fn create_table(&self, table: &TableSpec) -> Vec<String> {
        let mut parts: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("\"{}\" {}", c.name, self.column_sql(c)))
            .collect();
        parts.extend(table.foreign_keys.iter().map(foreign_key_clause));
        vec![format!(
            "CREATE TABLE \"{}\" ({})",
            table.name,
            parts.join(", ")
        )]
    }

    fn drop_table(&self, table_name: &str) -> Vec<String> {
        vec![format!("DROP TABLE IF EXISTS \"{table_name}\"")]
    }

    fn add_column(&self, table_name: &str, column: &ColumnSpec) -> Vec<String> {
        vec![format!(
            "ALTER TABLE \"{table_name}\" ADD COLUMN \"{}\" {}",
            column.name,
            self.column_sql(column)
        )]
    }

    fn drop_column(&self, table_name: &str, column_name: &str) -> Vec<String> {
        vec![format!(
            "ALTER TABLE \"{table_name}\" DROP COLUMN \"{column_name}\""
        )]
    }

    fn alter_column(
        &self,
        table_name: &str,
        _from: &ColumnSpec,
        to: &ColumnSpec,
    ) -> StratumResult<Vec<String>> {
        Err(StratumError::Database(format!(
            "SQLite cannot alter column \"{}\".\"{}\" in place; recreate the table instead",
            table_name, to.name
        )))
    }

    fn create_index(&self, index: &IndexSpec) -> Vec<String> {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let cols: Vec<String> = index.columns.iter().map(|c| format!("\"{c}\"")).collect();
        vec![format!(
            "CREATE {unique}INDEX \"{}\" ON \"{}\" ({})",
            index.name,
            index.table,
            cols.join(", ")
        )]
    }

    fn drop_index(&self, index: &IndexSpec) -> Vec<String> {
        vec![format!("DROP INDEX IF EXISTS \"{}\"", index.name)]
    }

    fn add_foreign_key(&self, fk: &ForeignKeySpec) -> StratumResult<Vec<String>> {
        Err(StratumError::Database(format!(
            "SQLite cannot add foreign key \"{}\" to existing table \"{}\"; declare it at table creation",
            fk.name, fk.table
        )))
    }

    fn drop_foreign_key(&self, fk: &ForeignKeySpec) -> StratumResult<Vec<String>> {
        Err(StratumError::Database(format!(
            "SQLite cannot drop foreign key \"{}\" from table \"{}\"",
            fk.name, fk.table
        )))
    }

    fn placeholder(&self, n: usize) -> String {
        format!("?{n}")
    }

    fn null_safe_eq(&self, column: &str, n: usize) -> String {
        format!("\"{column}\" IS ?{n}")
    }

    fn guard_query(&self, guard: &Guard) -> (String, Vec<Value>) {
        match guard {
            Guard::TableExists(t) | Guard::TableAbsent(t) => (
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1".to_string(),
                vec![Value::String(t.clone())],
            ),
            Guard::ColumnExists { table, column } | Guard::ColumnAbsent { table, column } => (
                "SELECT name FROM pragma_table_info(?1) WHERE name = ?2".to_string(),
                vec![Value::String(table.clone()), Value::String(column.clone())],
            ),
            Guard::IndexExists(i) | Guard::IndexAbsent(i) => (
                "SELECT name FROM sqlite_master WHERE type = 'index' AND name = ?1".to_string(),
                vec![Value::String(i.clone())],
            ),
        }
    }
}

// ── PostgreSQL ───────────────────────────────────────────────────────────

/// Schema editor for PostgreSQL.
pub struct PostgresSchemaEditor;

impl SchemaEditor for PostgresSchemaEditor {
    fn vendor(&self) -> &'static str {
        "postgresql"
    }

    fn column_sql(&self, column: &ColumnSpec) -> String {
        let type_str = pg_type_sql(&column.col_type);
        let constraint_str = if column.primary_key || column.col_type == ColumnType::BigSerial {
            " PRIMARY KEY"
        } else if column.nullable {
            " NULL"
        } else {
            " NOT NULL"
        };
        let unique_str = if column.unique && !column.primary_key {
            " UNIQUE"
        } else {
            ""
        };
        format!("{type_str}{constraint_str}{unique_str}{}", default_sql(column))
    }

    fn create_table(&self, table: &TableSpec) -> Vec<String> {
        let mut parts: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("\"{}\" {}", c.name, self.column_sql(c)))
            .collect();
        parts.extend(table.foreign_keys.iter().map(foreign_key_clause));
        vec![format!(
            "CREATE TABLE \"{}\" ({})",
            table.name,
            parts.join(", ")
        )]
    }

    fn drop_table(&self, table_name: &str) -> Vec<String> {
        vec![format!("DROP TABLE IF EXISTS \"{table_name}\"")]
    }

    fn add_column(&self, table_name: &str, column: &ColumnSpec) -> Vec<String> {
        vec![format!(
            "ALTER TABLE \"{table_name}\" ADD COLUMN \"{}\" {}",
            column.name,
            self.column_sql(column)
        )]
    }

    fn drop_column(&self, table_name: &str, column_name: &str) -> Vec<String> {
        vec![format!(
            "ALTER TABLE \"{table_name}\" DROP COLUMN \"{column_name}\""
        )]
    }

    fn alter_column(
        &self,
        table_name: &str,
        _from: &ColumnSpec,
        to: &ColumnSpec,
    ) -> StratumResult<Vec<String>> {
        let col = &to.name;
        let mut stmts = vec![format!(
            "ALTER TABLE \"{table_name}\" ALTER COLUMN \"{col}\" TYPE {}",
            pg_type_sql(&to.col_type)
        )];

        if to.nullable {
            stmts.push(format!(
                "ALTER TABLE \"{table_name}\" ALTER COLUMN \"{col}\" DROP NOT NULL"
            ));
        } else {
            stmts.push(format!(
                "ALTER TABLE \"{table_name}\" ALTER COLUMN \"{col}\" SET NOT NULL"
            ));
        }

        if let Some(ref val) = to.default {
            let def = match val {
                Value::Null => "NULL".to_string(),
                Value::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
                Value::Int(i) => i.to_string(),
                Value::Float(f) => f.to_string(),
                Value::String(s) => format!("'{}'", s.replace('\'', "''")),
                _ => "NULL".to_string(),
            };
            stmts.push(format!(
                "ALTER TABLE \"{table_name}\" ALTER COLUMN \"{col}\" SET DEFAULT {def}"
            ));
        } else {
            stmts.push(format!(
                "ALTER TABLE \"{table_name}\" ALTER COLUMN \"{col}\" DROP DEFAULT"
            ));
        }

        Ok(stmts)
    }

    fn create_index(&self, index: &IndexSpec) -> Vec<String> {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let cols: Vec<String> = index.columns.iter().map(|c| format!("\"{c}\"")).collect();
        vec![format!(
            "CREATE {unique}INDEX \"{}\" ON \"{}\" ({})",
            index.name,
            index.table,
            cols.join(", ")
        )]
    }

    fn drop_index(&self, index: &IndexSpec) -> Vec<String> {
        vec![format!("DROP INDEX IF EXISTS \"{}\"", index.name)]
    }

    fn add_foreign_key(&self, fk: &ForeignKeySpec) -> StratumResult<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE \"{}\" ADD {}",
            fk.table,
            foreign_key_clause(fk)
        )])
    }

    fn drop_foreign_key(&self, fk: &ForeignKeySpec) -> StratumResult<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE \"{}\" DROP CONSTRAINT \"{}\"",
            fk.table, fk.name
        )])
    }

    fn placeholder(&self, n: usize) -> String {
        format!("${n}")
    }

    fn null_safe_eq(&self, column: &str, n: usize) -> String {
        format!("\"{column}\" IS NOT DISTINCT FROM ${n}")
    }

    fn guard_query(&self, guard: &Guard) -> (String, Vec<Value>) {
        match guard {
            Guard::TableExists(t) | Guard::TableAbsent(t) => (
                "SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1"
                    .to_string(),
                vec![Value::String(t.clone())],
            ),
            Guard::ColumnExists { table, column } | Guard::ColumnAbsent { table, column } => (
                "SELECT 1 FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2"
                    .to_string(),
                vec![Value::String(table.clone()), Value::String(column.clone())],
            ),
            Guard::IndexExists(i) | Guard::IndexAbsent(i) => (
                "SELECT 1 FROM pg_indexes \
                 WHERE schemaname = current_schema() AND indexname = $1"
                    .to_string(),
                vec![Value::String(i.clone())],
            ),
        }
    }
}

/// Looks up an editor for a backend vendor name.
pub fn editor_for_vendor(vendor: &str) -> StratumResult<Box<dyn SchemaEditor>> {
    match vendor {
        "sqlite" => Ok(Box::new(SqliteSchemaEditor)),
        "postgresql" => Ok(Box::new(PostgresSchemaEditor)),
        other => Err(StratumError::Configuration(format!(
            "no schema editor for vendor: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ReferentialAction;

    fn widgets_table() -> TableSpec {
        TableSpec::new("widgets")
            .column(ColumnSpec::new("id", ColumnType::BigSerial).primary_key())
            .column(ColumnSpec::new("name", ColumnType::VarChar { max_length: 100 }))
            .column(ColumnSpec::new("color", ColumnType::Text).nullable())
    }

    // ── SQLite ──────────────────────────────────────────────────────

    #[test]
    fn test_sqlite_create_table() {
        let sqls = SqliteSchemaEditor.create_table(&widgets_table());
        assert_eq!(sqls.len(), 1);
        assert!(sqls[0].starts_with("CREATE TABLE \"widgets\""));
        assert!(sqls[0].contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sqls[0].contains("\"name\" TEXT NOT NULL"));
        assert!(sqls[0].contains("\"color\" TEXT NULL"));
    }

    #[test]
    fn test_sqlite_create_table_with_fk() {
        let table = TableSpec::new("tasks")
            .column(ColumnSpec::new("id", ColumnType::BigSerial).primary_key())
            .column(ColumnSpec::new("parent_id", ColumnType::BigInt).nullable())
            .foreign_key(ForeignKeySpec {
                name: "fk_tasks_parent".into(),
                table: "tasks".into(),
                columns: vec!["parent_id".into()],
                ref_table: "tasks".into(),
                ref_columns: vec!["id".into()],
                on_delete: ReferentialAction::SetNull,
            });
        let sqls = SqliteSchemaEditor.create_table(&table);
        assert!(sqls[0].contains("FOREIGN KEY (\"parent_id\") REFERENCES \"tasks\" (\"id\")"));
        assert!(sqls[0].contains("ON DELETE SET NULL"));
    }

    #[test]
    fn test_sqlite_alter_column_rejected() {
        let from = ColumnSpec::new("name", ColumnType::Text);
        let to = ColumnSpec::new("name", ColumnType::VarChar { max_length: 10 });
        assert!(SqliteSchemaEditor
            .alter_column("widgets", &from, &to)
            .is_err());
    }

    #[test]
    fn test_sqlite_add_foreign_key_rejected() {
        let fk = ForeignKeySpec {
            name: "fk".into(),
            table: "a".into(),
            columns: vec!["b_id".into()],
            ref_table: "b".into(),
            ref_columns: vec!["id".into()],
            on_delete: ReferentialAction::Cascade,
        };
        assert!(SqliteSchemaEditor.add_foreign_key(&fk).is_err());
        assert!(SqliteSchemaEditor.drop_foreign_key(&fk).is_err());
    }

    #[test]
    fn test_sqlite_insert_row_sql() {
        let sql = SqliteSchemaEditor.insert_row_sql("widgets", &["name".into(), "color".into()]);
        assert_eq!(
            sql,
            "INSERT INTO \"widgets\" (\"name\", \"color\") VALUES (?1, ?2)"
        );
    }

    #[test]
    fn test_sqlite_delete_row_sql_null_safe() {
        let sql = SqliteSchemaEditor.delete_row_sql("widgets", &["name".into(), "color".into()]);
        assert_eq!(
            sql,
            "DELETE FROM \"widgets\" WHERE \"name\" IS ?1 AND \"color\" IS ?2"
        );
    }

    #[test]
    fn test_sqlite_guard_query_column() {
        let guard = Guard::ColumnAbsent {
            table: "widgets".into(),
            column: "color".into(),
        };
        let (sql, params) = SqliteSchemaEditor.guard_query(&guard);
        assert!(sql.contains("pragma_table_info"));
        assert_eq!(params.len(), 2);
    }

    // ── PostgreSQL ──────────────────────────────────────────────────

    #[test]
    fn test_postgres_create_table() {
        let sqls = PostgresSchemaEditor.create_table(&widgets_table());
        assert!(sqls[0].contains("\"id\" BIGSERIAL PRIMARY KEY"));
        assert!(sqls[0].contains("\"name\" VARCHAR(100) NOT NULL"));
    }

    #[test]
    fn test_postgres_alter_column() {
        let from = ColumnSpec::new("name", ColumnType::VarChar { max_length: 100 });
        let to = ColumnSpec::new("name", ColumnType::VarChar { max_length: 200 }).nullable();
        let sqls = PostgresSchemaEditor
            .alter_column("widgets", &from, &to)
            .unwrap();
        assert!(sqls[0].contains("TYPE VARCHAR(200)"));
        assert!(sqls[1].contains("DROP NOT NULL"));
        assert!(sqls[2].contains("DROP DEFAULT"));
    }

    #[test]
    fn test_postgres_add_drop_foreign_key() {
        let fk = ForeignKeySpec {
            name: "fk_tasks_widget".into(),
            table: "tasks".into(),
            columns: vec!["widget_id".into()],
            ref_table: "widgets".into(),
            ref_columns: vec!["id".into()],
            on_delete: ReferentialAction::Cascade,
        };
        let add = PostgresSchemaEditor.add_foreign_key(&fk).unwrap();
        assert!(add[0].contains("ADD CONSTRAINT \"fk_tasks_widget\""));
        assert!(add[0].contains("ON DELETE CASCADE"));

        let drop = PostgresSchemaEditor.drop_foreign_key(&fk).unwrap();
        assert!(drop[0].contains("DROP CONSTRAINT \"fk_tasks_widget\""));
    }

    #[test]
    fn test_postgres_placeholders() {
        assert_eq!(PostgresSchemaEditor.placeholder(3), "$3");
        assert_eq!(
            PostgresSchemaEditor.null_safe_eq("color", 2),
            "\"color\" IS NOT DISTINCT FROM $2"
        );
    }

    // ── render ──────────────────────────────────────────────────────

    #[test]
    fn test_render_insert_rows_one_statement_per_row() {
        let kind = OperationKind::InsertRows {
            table: "widgets".into(),
            columns: vec!["name".into()],
            rows: vec![vec![Value::from("a")], vec![Value::from("b")]],
        };
        let stmts = SqliteSchemaEditor.render(&kind).unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].params, vec![Value::from("a")]);
        assert_eq!(stmts[1].params, vec![Value::from("b")]);
    }

    #[test]
    fn test_render_raw_statement() {
        let kind = OperationKind::RawStatement {
            up_sql: "ANALYZE".into(),
            down_sql: None,
        };
        let stmts = PostgresSchemaEditor.render(&kind).unwrap();
        assert_eq!(stmts, vec![SqlStatement::new("ANALYZE")]);
    }

    #[test]
    fn test_editor_for_vendor() {
        assert!(editor_for_vendor("sqlite").is_ok());
        assert!(editor_for_vendor("postgresql").is_ok());
        assert!(editor_for_vendor("mysql").is_err());
    }
}
