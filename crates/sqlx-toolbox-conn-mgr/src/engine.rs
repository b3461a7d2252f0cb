//! Database engine: a lazily-connecting pool for one connection URL

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use tracing::debug;

use crate::config::{DatabaseType, PoolConfig, redact_url};
use crate::{Error, Result};

/// Database engine shared by every session created from it.
///
/// ## Architecture
///
/// The engine owns a single sqlx `AnyPool`, so SQLite and PostgreSQL go
/// through the same code path. The pool is created lazily: no connection is
/// opened until the first statement runs, which keeps `connect_*` calls free
/// of network or file I/O beyond option parsing.
///
/// ## State Management
///
/// - **`closed`**: Prevents use after the engine has been closed
/// - **`url`**: Connection URL the pool was created from
/// - **`database_type`**: Backend inferred from the URL scheme
#[derive(Debug)]
pub struct Engine {
   /// Pool shared by all sessions of this engine
   pool: AnyPool,

   /// Connection URL as given to sqlx
   url: String,

   /// Backend behind the pool
   database_type: DatabaseType,

   /// Marks the engine as closed to prevent further operations
   closed: AtomicBool,
}

impl Engine {
   /// Create an engine for `url` without opening any connection.
   ///
   /// Must be called from within a Tokio runtime; the pool spawns its idle
   /// reaper on creation.
   ///
   /// # Errors
   ///
   /// Returns [`Error::Configuration`] for URL schemes other than `sqlite`,
   /// `postgres` and `postgresql`, and [`Error::Sqlx`] when sqlx rejects the
   /// URL.
   pub fn connect(url: &str, custom_config: Option<PoolConfig>) -> Result<Arc<Self>> {
      let database_type = DatabaseType::from_url(url).ok_or_else(|| {
         Error::configuration(format!(
            "Unsupported database url: {}",
            redact_url(url)
         ))
      })?;
      let config = custom_config.unwrap_or_default();

      sqlx::any::install_default_drivers();

      let pool = AnyPoolOptions::new()
         .max_connections(config.max_connections)
         .idle_timeout(config.idle_timeout)
         .connect_lazy(url)?;

      debug!(
         url = %redact_url(url),
         database_type = %database_type,
         max_connections = config.max_connections,
         "engine created"
      );

      Ok(Arc::new(Self {
         pool,
         url: url.to_string(),
         database_type,
         closed: AtomicBool::new(false),
      }))
   }

   /// Access the pool, failing once the engine has been closed.
   pub fn pool(&self) -> Result<&AnyPool> {
      if self.is_closed() {
         return Err(Error::DatabaseClosed);
      }
      Ok(&self.pool)
   }

   pub fn url(&self) -> &str {
      &self.url
   }

   pub fn database_type(&self) -> DatabaseType {
      self.database_type
   }

   pub fn is_closed(&self) -> bool {
      self.closed.load(Ordering::Acquire)
   }

   /// Close the pool. Connections checked out by open transactions are
   /// closed as they are returned.
   pub async fn close(&self) {
      if self.closed.swap(true, Ordering::AcqRel) {
         return;
      }
      self.pool.close().await;
      debug!(url = %redact_url(&self.url), "engine closed");
   }
}
