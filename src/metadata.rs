//! Declarative metadata: the set of tables known to a toolbox.

use indexmap::IndexMap;
use sqlx_toolbox_conn_mgr::{DatabaseType, Session};
use sqlx_toolbox_query::{Model, TableSchema};
use tracing::debug;

use crate::Result;

/// Registered table schemas, in registration order.
///
/// Registering a table with a name that is already present replaces the
/// earlier schema in place.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
   tables: IndexMap<String, TableSchema>,
}

impl Metadata {
   pub fn new() -> Self {
      Self::default()
   }

   /// Register a raw table schema.
   pub fn register(&mut self, schema: TableSchema) {
      self.tables.insert(schema.name.clone(), schema);
   }

   /// Register the table of model `M`.
   pub fn register_model<M: Model>(&mut self) {
      self.register(M::schema());
   }

   pub fn get(&self, name: &str) -> Option<&TableSchema> {
      self.tables.get(name)
   }

   pub fn contains(&self, name: &str) -> bool {
      self.tables.contains_key(name)
   }

   pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
      self.tables.values()
   }

   pub fn len(&self) -> usize {
      self.tables.len()
   }

   pub fn is_empty(&self) -> bool {
      self.tables.is_empty()
   }

   /// Create every registered table that does not exist yet, then commit.
   pub async fn create_all(&self, session: &Session, database_type: DatabaseType) -> Result<()> {
      for schema in self.tables.values() {
         let ddl = schema.create_table_sql(database_type)?;
         debug!(table = %schema.name, "creating table");
         session.execute(sqlx::query(&ddl)).await?;
      }
      session.commit().await?;
      Ok(())
   }

   /// Drop every registered table, last registered first, then commit.
   pub async fn drop_all(&self, session: &Session) -> Result<()> {
      for schema in self.tables.values().rev() {
         let ddl = schema.drop_table_sql()?;
         debug!(table = %schema.name, "dropping table");
         session.execute(sqlx::query(&ddl)).await?;
      }
      session.commit().await?;
      Ok(())
   }
}
