//! Declarative model descriptions.
//!
//! A model is a Rust type decodable from a row plus a static description of
//! the table it lives in. The description is enough to render the table's
//! `CREATE TABLE` statement for either backend; mapping beyond that is left
//! to sqlx's `FromRow`.
//!
//! # Example
//!
//! ```no_run
//! use sqlx_toolbox_query::{Column, ColumnType, Model};
//!
//! #[derive(sqlx::FromRow)]
//! struct Member {
//!    id: i64,
//!    name: String,
//! }
//!
//! impl Model for Member {
//!    const TABLE_NAME: &'static str = "members";
//!
//!    fn columns() -> Vec<Column> {
//!       vec![
//!          Column::new("id", ColumnType::BigInt).primary_key().autoincrement(),
//!          Column::new("name", ColumnType::Text),
//!       ]
//!    }
//! }
//! ```

use sqlx::FromRow;
use sqlx::any::AnyRow;
use sqlx_toolbox_conn_mgr::DatabaseType;

use crate::Error;
use crate::sql::{quote_identifier, validate_identifier};

/// A type stored in one table and decodable from its rows.
pub trait Model: for<'r> FromRow<'r, AnyRow> + Send + Unpin + 'static {
   /// Name of the backing table.
   const TABLE_NAME: &'static str;

   /// Column definitions in table order.
   fn columns() -> Vec<Column>;

   /// Full table description.
   fn schema() -> TableSchema {
      TableSchema::new(Self::TABLE_NAME, Self::columns())
   }
}

/// Portable column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
   /// 32-bit integer (decode as `i32` on PostgreSQL, `i64` on SQLite)
   Integer,
   /// 64-bit integer
   BigInt,
   /// Double precision float
   Float,
   Text,
   Boolean,
   Blob,
}

impl ColumnType {
   fn sql_name(self, database_type: DatabaseType) -> &'static str {
      match (database_type, self) {
         (DatabaseType::Sqlite3, ColumnType::Integer | ColumnType::BigInt) => "INTEGER",
         (DatabaseType::Sqlite3, ColumnType::Float) => "REAL",
         (DatabaseType::Sqlite3, ColumnType::Blob) => "BLOB",
         (DatabaseType::Postgresql, ColumnType::Integer) => "INTEGER",
         (DatabaseType::Postgresql, ColumnType::BigInt) => "BIGINT",
         (DatabaseType::Postgresql, ColumnType::Float) => "DOUBLE PRECISION",
         (DatabaseType::Postgresql, ColumnType::Blob) => "BYTEA",
         (_, ColumnType::Text) => "TEXT",
         (_, ColumnType::Boolean) => "BOOLEAN",
      }
   }
}

/// A single column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
   pub name: String,
   pub column_type: ColumnType,
   pub primary_key: bool,
   pub autoincrement: bool,
   pub nullable: bool,
}

impl Column {
   /// A non-null, non-key column.
   pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
      Self {
         name: name.into(),
         column_type,
         primary_key: false,
         autoincrement: false,
         nullable: false,
      }
   }

   pub fn primary_key(mut self) -> Self {
      self.primary_key = true;
      self
   }

   /// Let the database generate values. Only honoured on a sole integer
   /// primary key.
   pub fn autoincrement(mut self) -> Self {
      self.autoincrement = true;
      self
   }

   pub fn nullable(mut self) -> Self {
      self.nullable = true;
      self
   }
}

/// Table name plus its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
   pub name: String,
   pub columns: Vec<Column>,
}

impl TableSchema {
   pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
      Self {
         name: name.into(),
         columns,
      }
   }

   /// Render `CREATE TABLE IF NOT EXISTS` for the given backend.
   pub fn create_table_sql(&self, database_type: DatabaseType) -> Result<String, Error> {
      validate_identifier(&self.name)?;
      if self.columns.is_empty() {
         return Err(Error::Other(format!("table '{}' has no columns", self.name)));
      }

      let keys: Vec<&Column> = self.columns.iter().filter(|c| c.primary_key).collect();
      let inline_key = keys.len() == 1;

      let mut parts = Vec::with_capacity(self.columns.len() + 1);
      for column in &self.columns {
         validate_identifier(&column.name)?;
         parts.push(render_column(column, database_type, inline_key));
      }

      if keys.len() > 1 {
         let names: Vec<String> = keys.iter().map(|c| quote_identifier(&c.name)).collect();
         parts.push(format!("PRIMARY KEY ({})", names.join(", ")));
      }

      Ok(format!(
         "CREATE TABLE IF NOT EXISTS {} ({})",
         quote_identifier(&self.name),
         parts.join(", ")
      ))
   }

   /// Render `DROP TABLE IF EXISTS`.
   pub fn drop_table_sql(&self) -> Result<String, Error> {
      validate_identifier(&self.name)?;
      Ok(format!("DROP TABLE IF EXISTS {}", quote_identifier(&self.name)))
   }
}

fn render_column(column: &Column, database_type: DatabaseType, inline_key: bool) -> String {
   let name = quote_identifier(&column.name);
   let is_integer = matches!(column.column_type, ColumnType::Integer | ColumnType::BigInt);

   if inline_key && column.primary_key {
      if column.autoincrement && is_integer {
         return match database_type {
            DatabaseType::Sqlite3 => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", name),
            DatabaseType::Postgresql if column.column_type == ColumnType::BigInt => {
               format!("{} BIGSERIAL PRIMARY KEY", name)
            }
            DatabaseType::Postgresql => format!("{} SERIAL PRIMARY KEY", name),
         };
      }
      return format!(
         "{} {} PRIMARY KEY",
         name,
         column.column_type.sql_name(database_type)
      );
   }

   let mut sql = format!("{} {}", name, column.column_type.sql_name(database_type));
   if !column.nullable && !column.primary_key {
      sql.push_str(" NOT NULL");
   }
   sql
}
