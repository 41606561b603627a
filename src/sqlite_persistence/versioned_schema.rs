use anyhow::{bail, Result};
use rusqlite::{params, types::Type, Connection};

/// Offset added to the schema version stored in `PRAGMA user_version`, so that a
/// database created by something else is never mistaken for one of ours.
pub const BASE_DB_VERSION: usize = 7100;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Only mutated when optional field assignments are passed
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
        }
    }

    fn from_sql(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            "BLOB" => Some(&SqlType::Blob),
            _ => None,
        }
    }
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<S>,
}

impl<S: AsRef<str>> Column<'_, S> {
    /// Column definition as used inside `CREATE TABLE` and `ALTER TABLE ADD COLUMN`.
    pub fn definition_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name.as_ref(), self.sql_type.as_sql());
        if self.is_primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.non_null {
            sql.push_str(" NOT NULL");
        }
        if self.is_unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default_value) = &self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default_value.as_ref()));
        }
        sql
    }
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        let columns_sql = self
            .columns
            .iter()
            .map(|c| c.definition_sql())
            .collect::<Vec<_>>()
            .join(", ");
        create_sql.push_str(&columns_sql);

        for unique_constraint in self.unique_constraints {
            create_sql.push_str(&format!(", UNIQUE ({})", unique_constraint.join(", ")));
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;

        for (index_name, column_name) in self.indices {
            self.create_index(conn, index_name, column_name)?;
        }
        Ok(())
    }

    pub fn create_index(&self, conn: &Connection, index_name: &str, column_name: &str) -> Result<()> {
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS {} ON {}({});",
                index_name, self.name, column_name
            ),
            params![],
        )?;
        Ok(())
    }

    /// Adds a column declared in this table to an existing table created by an
    /// older schema version.
    pub fn add_column(&self, conn: &Connection, column_name: &str) -> Result<()> {
        let column = match self.columns.iter().find(|c| c.name == column_name) {
            Some(c) => c,
            None => bail!("Table {} declares no column {}", self.name, column_name),
        };
        conn.execute(
            &format!(
                "ALTER TABLE {} ADD COLUMN {};",
                self.name,
                column.definition_sql()
            ),
            params![],
        )?;
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

fn strip_leading_and_trailing_parentheses<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    if s.starts_with('(') && s.ends_with(')') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            validate_columns(conn, table)?;
            validate_indices(conn, table)?;
            validate_unique_constraints(conn, table)?;
        }
        Ok(())
    }
}

fn validate_columns(conn: &Connection, table: &Table) -> Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table.name))?;
    let actual_columns: Vec<Column<'_, String>> = stmt
        .query_map(params![], |row| {
            let type_name = row.get::<_, String>(2)?;
            let sql_type = SqlType::from_sql(&type_name).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(2, type_name.clone(), Type::Text)
            })?;
            Ok(Column {
                name: row.get::<usize, String>(1)?,
                sql_type,
                non_null: row.get::<_, i32>(3)? == 1,
                default_value: row.get::<_, Option<String>>(4)?,
                is_primary_key: row.get::<_, i32>(5)? == 1,
                is_unique: false,
            })
        })?
        .collect::<Result<_, _>>()?;

    if actual_columns.len() != table.columns.len() {
        bail!(
            "Table {} has {} columns, expected {}. Found column names: {}, expected: {}",
            table.name,
            actual_columns.len(),
            table.columns.len(),
            actual_columns
                .iter()
                .map(|c| c.name.clone())
                .collect::<Vec<_>>()
                .join(", "),
            table
                .columns
                .iter()
                .map(|c| c.name)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    for (actual, expected) in actual_columns.iter().zip(table.columns.iter()) {
        if actual.name != expected.name {
            bail!(
                "Table {} Column name mismatch: expected {}, got {}",
                table.name,
                expected.name,
                actual.name
            );
        }
        if actual.sql_type != expected.sql_type {
            bail!(
                "Table {} Column {} type mismatch: expected {:?}, got {:?}",
                table.name,
                expected.name,
                expected.sql_type,
                actual.sql_type
            );
        }
        if actual.non_null != expected.non_null {
            bail!(
                "Table {} Column {} non-null mismatch: expected {}, got {}",
                table.name,
                expected.name,
                expected.non_null,
                actual.non_null
            );
        }
        // SQLite may report defaults wrapped in parentheses
        if actual
            .default_value
            .as_ref()
            .map(strip_leading_and_trailing_parentheses)
            != expected
                .default_value
                .map(strip_leading_and_trailing_parentheses)
        {
            bail!(
                "Table {} Column {} default value mismatch: expected {:?}, got {:?}",
                table.name,
                expected.name,
                expected.default_value,
                actual.default_value
            );
        }
        if actual.is_primary_key != expected.is_primary_key {
            bail!(
                "Table {} Column {} primary key mismatch: expected {}, got {}",
                table.name,
                expected.name,
                expected.is_primary_key,
                actual.is_primary_key
            );
        }
    }
    Ok(())
}

fn validate_indices(conn: &Connection, table: &Table) -> Result<()> {
    for (index_name, _column) in table.indices {
        let index_exists: bool = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                params![index_name, table.name],
                |_| Ok(true),
            )
            .unwrap_or(false);

        if !index_exists {
            bail!("Table {} is missing index '{}'", table.name, index_name);
        }
    }
    Ok(())
}

fn validate_unique_constraints(conn: &Connection, table: &Table) -> Result<()> {
    if table.unique_constraints.is_empty() {
        return Ok(());
    }

    // Unique constraints show up as indices with unique=1
    let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", table.name))?;
    let unique_indices: Vec<String> = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let is_unique: i32 = row.get(2)?;
            Ok((name, is_unique))
        })?
        .filter_map(|r| r.ok())
        .filter(|(_, is_unique)| *is_unique == 1)
        .map(|(name, _)| name)
        .collect();

    let mut unique_index_columns: Vec<Vec<String>> = Vec::new();
    for index_name in &unique_indices {
        let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
        let mut cols: Vec<String> = idx_stmt
            .query_map([], |row| row.get::<_, String>(2))?
            .filter_map(|r| r.ok())
            .collect();
        cols.sort();
        unique_index_columns.push(cols);
    }

    for expected_columns in table.unique_constraints {
        let mut expected_sorted: Vec<&str> = expected_columns.to_vec();
        expected_sorted.sort();

        let found = unique_index_columns.iter().any(|actual_cols| {
            actual_cols.iter().map(|s| s.as_str()).collect::<Vec<_>>() == expected_sorted
        });

        if !found {
            bail!(
                "Table {} is missing unique constraint on columns ({})",
                table.name,
                expected_columns.join(", ")
            );
        }
    }
    Ok(())
}
