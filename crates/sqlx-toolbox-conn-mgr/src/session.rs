//! Sessions: units of work bound to an engine

use std::sync::Arc;

use sqlx::any::{AnyArguments, AnyQueryResult, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Transaction};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::Result;
use crate::engine::Engine;

/// A unit of work against an [`Engine`].
///
/// Reads run on the pool until the session writes; the first call to
/// [`Session::execute`] opens a transaction, after which every statement of
/// the session runs on that transaction until [`Session::commit`] or
/// [`Session::rollback`]. Dropping a session with an open transaction rolls
/// it back.
pub struct Session {
   id: Uuid,
   engine: Arc<Engine>,
   tx: Mutex<Option<Transaction<'static, Any>>>,
}

impl Session {
   pub(crate) fn new(engine: Arc<Engine>) -> Self {
      let id = Uuid::new_v4();
      debug!(session = %id, "session created");
      Self {
         id,
         engine,
         tx: Mutex::new(None),
      }
   }

   /// Identifier used in log records for this session.
   pub fn id(&self) -> Uuid {
      self.id
   }

   pub fn engine(&self) -> &Arc<Engine> {
      &self.engine
   }

   /// Whether a transaction is currently open.
   pub async fn in_transaction(&self) -> bool {
      self.tx.lock().await.is_some()
   }

   /// Open a transaction if none is open yet.
   pub async fn begin(&self) -> Result<()> {
      let mut guard = self.tx.lock().await;
      if guard.is_none() {
         *guard = Some(self.begin_transaction().await?);
      }
      Ok(())
   }

   /// Execute a write statement, opening a transaction first if needed.
   pub async fn execute<'q>(
      &self,
      query: Query<'q, Any, AnyArguments<'q>>,
   ) -> Result<AnyQueryResult> {
      let mut guard = self.tx.lock().await;
      let tx = match guard.take() {
         Some(tx) => guard.insert(tx),
         None => guard.insert(self.begin_transaction().await?),
      };

      Ok(query.execute(&mut **tx).await?)
   }

   /// Run a query and return every row.
   pub async fn fetch_all<'q>(&self, query: Query<'q, Any, AnyArguments<'q>>) -> Result<Vec<AnyRow>> {
      let mut guard = self.tx.lock().await;
      let rows = match guard.as_mut() {
         Some(tx) => query.fetch_all(&mut **tx).await?,
         None => query.fetch_all(self.engine.pool()?).await?,
      };
      Ok(rows)
   }

   /// Run a query and return the first row, if any.
   pub async fn fetch_optional<'q>(
      &self,
      query: Query<'q, Any, AnyArguments<'q>>,
   ) -> Result<Option<AnyRow>> {
      let mut guard = self.tx.lock().await;
      let row = match guard.as_mut() {
         Some(tx) => query.fetch_optional(&mut **tx).await?,
         None => query.fetch_optional(self.engine.pool()?).await?,
      };
      Ok(row)
   }

   /// Commit the open transaction. Does nothing when none is open.
   pub async fn commit(&self) -> Result<()> {
      if let Some(tx) = self.tx.lock().await.take() {
         tx.commit().await?;
         debug!(session = %self.id, "transaction committed");
      }
      Ok(())
   }

   /// Roll back the open transaction. Does nothing when none is open.
   pub async fn rollback(&self) -> Result<()> {
      if let Some(tx) = self.tx.lock().await.take() {
         tx.rollback().await?;
         debug!(session = %self.id, "transaction rolled back");
      }
      Ok(())
   }

   /// Release the session's connection, discarding uncommitted work.
   pub async fn close(&self) -> Result<()> {
      self.rollback().await?;
      debug!(session = %self.id, "session closed");
      Ok(())
   }

   async fn begin_transaction(&self) -> Result<Transaction<'static, Any>> {
      let tx = self.engine.pool()?.begin().await?;
      debug!(session = %self.id, "transaction started");
      Ok(tx)
   }
}

impl std::fmt::Debug for Session {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("Session")
         .field("id", &self.id)
         .field("url", &crate::config::redact_url(self.engine.url()))
         .finish()
   }
}

impl Drop for Session {
   fn drop(&mut self) {
      // An open sqlx Transaction queues its own ROLLBACK when dropped.
      debug!(session = %self.id, "dropping session");
   }
}

/// Builds sessions bound to one engine.
#[derive(Debug, Clone)]
pub struct SessionFactory {
   engine: Arc<Engine>,
}

impl SessionFactory {
   pub fn new(engine: Arc<Engine>) -> Self {
      Self { engine }
   }

   /// Create a fresh, unshared session.
   pub fn create(&self) -> Session {
      Session::new(Arc::clone(&self.engine))
   }

   pub fn engine(&self) -> &Arc<Engine> {
      &self.engine
   }
}
