//! Schema-change operations.
//!
//! An [`Operation`] is a single reversible DDL/DML primitive: its
//! [`OperationKind`] carries the structural payload, and an optional
//! [`Guard`] declares the precondition that makes it safe to re-run
//! against a partially-migrated database.
//!
//! Every `Drop*` variant carries the full spec of the object it removes, so
//! inversion never needs external state: [`Operation::invert`] is total
//! except for [`OperationKind::RawStatement`] without backward SQL.

use serde::{Deserialize, Serialize};
use stratum_db::Value;

/// Referential action taken on child rows when a referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    /// Delete child rows along with the parent.
    Cascade,
    /// Refuse to delete the parent while children exist.
    Restrict,
    /// Null out the referencing column.
    SetNull,
    /// Reset the referencing column to its default.
    SetDefault,
    /// Take no action (defer to constraint checking).
    NoAction,
}

impl ReferentialAction {
    /// The SQL keyword sequence for this action.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::NoAction => "NO ACTION",
        }
    }
}

/// The portable column types the engine can express.
///
/// Each dialect's schema editor maps these to native SQL types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Auto-incrementing 64-bit integer primary key.
    BigSerial,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Double-precision float.
    Float,
    /// Boolean.
    Boolean,
    /// Unbounded text.
    Text,
    /// Bounded text.
    VarChar {
        /// Maximum character length.
        max_length: u32,
    },
    /// Date and time with timezone.
    Timestamp,
    /// Raw bytes.
    Blob,
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// The column name.
    pub name: String,
    /// The portable column type.
    pub col_type: ColumnType,
    /// Whether NULL is permitted.
    #[serde(default)]
    pub nullable: bool,
    /// Whether this column is the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether values must be unique.
    #[serde(default)]
    pub unique: bool,
    /// An optional default value.
    #[serde(default)]
    pub default: Option<Value>,
}

impl ColumnSpec {
    /// Creates a column spec with the given name and type; NOT NULL,
    /// non-unique, not a primary key.
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            nullable: false,
            primary_key: false,
            unique: false,
            default: None,
        }
    }

    /// Marks this column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Permits NULL values.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Requires values to be unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets a default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// A foreign-key constraint definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeySpec {
    /// The constraint name.
    pub name: String,
    /// The referencing table.
    pub table: String,
    /// The referencing columns.
    pub columns: Vec<String>,
    /// The referenced table. May equal `table` for self-referential keys.
    pub ref_table: String,
    /// The referenced columns.
    pub ref_columns: Vec<String>,
    /// The declared action on parent-row deletion.
    pub on_delete: ReferentialAction,
}

/// An index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// The index name.
    pub name: String,
    /// The indexed table.
    pub table: String,
    /// The indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    #[serde(default)]
    pub unique: bool,
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// The table name.
    pub name: String,
    /// The column definitions, in order.
    pub columns: Vec<ColumnSpec>,
    /// Table-level foreign keys, declared at creation time.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeySpec>,
}

impl TableSpec {
    /// Creates a table spec with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Adds a column.
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a table-level foreign key.
    pub fn foreign_key(mut self, fk: ForeignKeySpec) -> Self {
        self.foreign_keys.push(fk);
        self
    }
}

/// A precondition evaluated immediately before an operation executes.
///
/// When the precondition does not hold, the operation is skipped and logged
/// as already satisfied; it never errors. This is what makes a guarded
/// operation safe to re-run against a database whose state was only
/// partially advanced by a prior crashed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// Run only if the named table exists.
    TableExists(String),
    /// Run only if the named table does not exist.
    TableAbsent(String),
    /// Run only if the column exists on the table.
    ColumnExists {
        /// The table to inspect.
        table: String,
        /// The column to look for.
        column: String,
    },
    /// Run only if the column does not exist on the table.
    ColumnAbsent {
        /// The table to inspect.
        table: String,
        /// The column to look for.
        column: String,
    },
    /// Run only if the named index exists.
    IndexExists(String),
    /// Run only if the named index does not exist.
    IndexAbsent(String),
}

impl Guard {
    /// Whether the guard is satisfied given that the inspected object
    /// does or does not exist.
    pub fn is_satisfied(&self, object_exists: bool) -> bool {
        match self {
            Self::TableExists(_) | Self::ColumnExists { .. } | Self::IndexExists(_) => {
                object_exists
            }
            Self::TableAbsent(_) | Self::ColumnAbsent { .. } | Self::IndexAbsent(_) => {
                !object_exists
            }
        }
    }

    /// The guard with its polarity flipped, used when deriving the guard of
    /// an inverted operation.
    pub fn inverted(&self) -> Self {
        match self {
            Self::TableExists(t) => Self::TableAbsent(t.clone()),
            Self::TableAbsent(t) => Self::TableExists(t.clone()),
            Self::ColumnExists { table, column } => Self::ColumnAbsent {
                table: table.clone(),
                column: column.clone(),
            },
            Self::ColumnAbsent { table, column } => Self::ColumnExists {
                table: table.clone(),
                column: column.clone(),
            },
            Self::IndexExists(i) => Self::IndexAbsent(i.clone()),
            Self::IndexAbsent(i) => Self::IndexExists(i.clone()),
        }
    }
}

/// The tagged variant describing what an operation does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperationKind {
    /// Create a table.
    CreateTable {
        /// The table to create.
        table: TableSpec,
    },
    /// Drop a table. Carries the full spec so the drop can be inverted.
    DropTable {
        /// The table being dropped.
        table: TableSpec,
    },
    /// Add a column to an existing table.
    AddColumn {
        /// The table to alter.
        table: String,
        /// The column to add.
        column: ColumnSpec,
    },
    /// Drop a column. Carries the full spec so the drop can be inverted.
    DropColumn {
        /// The table to alter.
        table: String,
        /// The column being dropped.
        column: ColumnSpec,
    },
    /// Change a column's type, nullability, or default.
    AlterColumn {
        /// The table to alter.
        table: String,
        /// The column definition before the change.
        from: ColumnSpec,
        /// The column definition after the change.
        to: ColumnSpec,
    },
    /// Create an index.
    CreateIndex {
        /// The index to create.
        index: IndexSpec,
    },
    /// Drop an index. Carries the full spec so the drop can be inverted.
    DropIndex {
        /// The index being dropped.
        index: IndexSpec,
    },
    /// Add a foreign-key constraint to an existing table.
    AddForeignKey {
        /// The constraint to add.
        foreign_key: ForeignKeySpec,
    },
    /// Drop a foreign-key constraint. Carries the full spec for inversion.
    DropForeignKey {
        /// The constraint being dropped.
        foreign_key: ForeignKeySpec,
    },
    /// Insert seed rows.
    InsertRows {
        /// The target table.
        table: String,
        /// The column names the row values map to.
        columns: Vec<String>,
        /// One value list per row.
        rows: Vec<Vec<Value>>,
    },
    /// Delete previously seeded rows by exact value match.
    DeleteRows {
        /// The target table.
        table: String,
        /// The column names the row values map to.
        columns: Vec<String>,
        /// One value list per row.
        rows: Vec<Vec<Value>>,
    },
    /// Run raw SQL. Omitting `down_sql` makes the owning changeset
    /// irreversible.
    RawStatement {
        /// SQL for the forward direction.
        up_sql: String,
        /// SQL for the backward direction, if any.
        #[serde(default)]
        down_sql: Option<String>,
    },
}

/// A single schema-change primitive with an optional idempotency guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// What the operation does.
    #[serde(flatten)]
    pub kind: OperationKind,
    /// The declared precondition, if any.
    #[serde(default)]
    pub guard: Option<Guard>,
}

impl Operation {
    /// Wraps an [`OperationKind`] with no guard.
    pub fn new(kind: OperationKind) -> Self {
        Self { kind, guard: None }
    }

    /// Attaches a guard to this operation.
    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    // ── Constructors ─────────────────────────────────────────────────

    /// A `CREATE TABLE` operation.
    pub fn create_table(table: TableSpec) -> Self {
        Self::new(OperationKind::CreateTable { table })
    }

    /// A `DROP TABLE` operation.
    pub fn drop_table(table: TableSpec) -> Self {
        Self::new(OperationKind::DropTable { table })
    }

    /// An `ALTER TABLE ... ADD COLUMN` operation.
    pub fn add_column(table: impl Into<String>, column: ColumnSpec) -> Self {
        Self::new(OperationKind::AddColumn {
            table: table.into(),
            column,
        })
    }

    /// An `ALTER TABLE ... DROP COLUMN` operation.
    pub fn drop_column(table: impl Into<String>, column: ColumnSpec) -> Self {
        Self::new(OperationKind::DropColumn {
            table: table.into(),
            column,
        })
    }

    /// A column alteration from one definition to another.
    pub fn alter_column(table: impl Into<String>, from: ColumnSpec, to: ColumnSpec) -> Self {
        Self::new(OperationKind::AlterColumn {
            table: table.into(),
            from,
            to,
        })
    }

    /// A `CREATE INDEX` operation.
    pub fn create_index(index: IndexSpec) -> Self {
        Self::new(OperationKind::CreateIndex { index })
    }

    /// A `DROP INDEX` operation.
    pub fn drop_index(index: IndexSpec) -> Self {
        Self::new(OperationKind::DropIndex { index })
    }

    /// An `ADD CONSTRAINT ... FOREIGN KEY` operation.
    pub fn add_foreign_key(foreign_key: ForeignKeySpec) -> Self {
        Self::new(OperationKind::AddForeignKey { foreign_key })
    }

    /// A `DROP CONSTRAINT` operation for a foreign key.
    pub fn drop_foreign_key(foreign_key: ForeignKeySpec) -> Self {
        Self::new(OperationKind::DropForeignKey { foreign_key })
    }

    /// A seed-row insertion.
    pub fn insert_rows(
        table: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        Self::new(OperationKind::InsertRows {
            table: table.into(),
            columns,
            rows,
        })
    }

    /// A raw SQL statement with both directions supplied.
    pub fn raw(up_sql: impl Into<String>, down_sql: impl Into<String>) -> Self {
        Self::new(OperationKind::RawStatement {
            up_sql: up_sql.into(),
            down_sql: Some(down_sql.into()),
        })
    }

    /// A raw SQL statement with no backward direction.
    pub fn raw_irreversible(up_sql: impl Into<String>) -> Self {
        Self::new(OperationKind::RawStatement {
            up_sql: up_sql.into(),
            down_sql: None,
        })
    }

    // ── Behavior ─────────────────────────────────────────────────────

    /// Returns a human-readable description of this operation.
    pub fn describe(&self) -> String {
        match &self.kind {
            OperationKind::CreateTable { table } => format!("Create table {}", table.name),
            OperationKind::DropTable { table } => format!("Drop table {}", table.name),
            OperationKind::AddColumn { table, column } => {
                format!("Add column {}.{}", table, column.name)
            }
            OperationKind::DropColumn { table, column } => {
                format!("Drop column {}.{}", table, column.name)
            }
            OperationKind::AlterColumn { table, to, .. } => {
                format!("Alter column {}.{}", table, to.name)
            }
            OperationKind::CreateIndex { index } => {
                format!("Create index {} on {}", index.name, index.table)
            }
            OperationKind::DropIndex { index } => format!("Drop index {}", index.name),
            OperationKind::AddForeignKey { foreign_key } => {
                format!("Add foreign key {} on {}", foreign_key.name, foreign_key.table)
            }
            OperationKind::DropForeignKey { foreign_key } => {
                format!("Drop foreign key {} on {}", foreign_key.name, foreign_key.table)
            }
            OperationKind::InsertRows { table, rows, .. } => {
                format!("Insert {} row(s) into {table}", rows.len())
            }
            OperationKind::DeleteRows { table, rows, .. } => {
                format!("Delete {} row(s) from {table}", rows.len())
            }
            OperationKind::RawStatement { .. } => "Run raw SQL".to_string(),
        }
    }

    /// Returns the structural inverse of this operation, or `None` when no
    /// inverse can be derived (raw SQL without backward text).
    ///
    /// A guard, when present, is carried over with its polarity flipped so
    /// the inverse stays idempotent.
    pub fn invert(&self) -> Option<Self> {
        let kind = match &self.kind {
            OperationKind::CreateTable { table } => OperationKind::DropTable {
                table: table.clone(),
            },
            OperationKind::DropTable { table } => OperationKind::CreateTable {
                table: table.clone(),
            },
            OperationKind::AddColumn { table, column } => OperationKind::DropColumn {
                table: table.clone(),
                column: column.clone(),
            },
            OperationKind::DropColumn { table, column } => OperationKind::AddColumn {
                table: table.clone(),
                column: column.clone(),
            },
            OperationKind::AlterColumn { table, from, to } => OperationKind::AlterColumn {
                table: table.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            OperationKind::CreateIndex { index } => OperationKind::DropIndex {
                index: index.clone(),
            },
            OperationKind::DropIndex { index } => OperationKind::CreateIndex {
                index: index.clone(),
            },
            OperationKind::AddForeignKey { foreign_key } => OperationKind::DropForeignKey {
                foreign_key: foreign_key.clone(),
            },
            OperationKind::DropForeignKey { foreign_key } => OperationKind::AddForeignKey {
                foreign_key: foreign_key.clone(),
            },
            OperationKind::InsertRows {
                table,
                columns,
                rows,
            } => OperationKind::DeleteRows {
                table: table.clone(),
                columns: columns.clone(),
                rows: rows.clone(),
            },
            OperationKind::DeleteRows {
                table,
                columns,
                rows,
            } => OperationKind::InsertRows {
                table: table.clone(),
                columns: columns.clone(),
                rows: rows.clone(),
            },
            OperationKind::RawStatement { up_sql, down_sql } => {
                let down = down_sql.clone()?;
                OperationKind::RawStatement {
                    up_sql: down,
                    down_sql: Some(up_sql.clone()),
                }
            }
        };
        Some(Self {
            kind,
            guard: self.guard.as_ref().map(Guard::inverted),
        })
    }

    /// Returns whether a structural inverse exists.
    pub fn reversible(&self) -> bool {
        !matches!(
            &self.kind,
            OperationKind::RawStatement { down_sql: None, .. }
        )
    }
}
