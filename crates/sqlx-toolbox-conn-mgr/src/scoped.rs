//! Thread-scoped session registry

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::Result;
use crate::session::{Session, SessionFactory};

/// Registry handing each OS thread its own [`Session`].
///
/// The first [`ScopedSession::get`] on a thread creates a session through
/// the factory; later calls on that thread return the same session until
/// [`ScopedSession::remove`] is called there.
///
/// Under a multi-threaded Tokio runtime a task may move between threads
/// across `.await` points. Keep the `Arc<Session>` returned by `get` for the
/// whole unit of work rather than calling `get` again after awaiting.
#[derive(Debug)]
pub struct ScopedSession {
   factory: SessionFactory,
   registry: Mutex<HashMap<ThreadId, Arc<Session>>>,
}

impl ScopedSession {
   pub fn new(factory: SessionFactory) -> Self {
      Self {
         factory,
         registry: Mutex::new(HashMap::new()),
      }
   }

   /// The calling thread's session, created on first use.
   pub fn get(&self) -> Arc<Session> {
      let thread_id = thread::current().id();
      let mut registry = self.registry.lock();
      Arc::clone(registry.entry(thread_id).or_insert_with(|| {
         debug!(?thread_id, "registering scoped session");
         Arc::new(self.factory.create())
      }))
   }

   /// Whether the calling thread already has a session.
   pub fn has_current(&self) -> bool {
      self.registry.lock().contains_key(&thread::current().id())
   }

   /// Number of threads currently holding a session.
   pub fn len(&self) -> usize {
      self.registry.lock().len()
   }

   pub fn is_empty(&self) -> bool {
      self.registry.lock().is_empty()
   }

   /// Close and forget the calling thread's session.
   pub async fn remove(&self) -> Result<()> {
      let session = self.registry.lock().remove(&thread::current().id());
      if let Some(session) = session {
         session.close().await?;
      }
      Ok(())
   }

   /// Close and forget every registered session.
   ///
   /// Every session is closed even when one fails; the first failure is
   /// returned.
   pub async fn remove_all(&self) -> Result<()> {
      let sessions: Vec<Arc<Session>> = self.registry.lock().drain().map(|(_, s)| s).collect();
      let mut first_error = None;
      for session in sessions {
         if let Err(e) = session.close().await {
            warn!(session = %session.id(), error = %e, "failed to close scoped session");
            first_error.get_or_insert(e);
         }
      }
      match first_error {
         Some(e) => Err(e),
         None => Ok(()),
      }
   }

   pub fn factory(&self) -> &SessionFactory {
      &self.factory
   }
}
