//! Error types for sqlx-toolbox-conn-mgr

use thiserror::Error;

/// Errors that may occur when configuring engines and sessions
#[derive(Error, Debug)]
pub enum Error {
   /// Precondition failure while configuring a connection: a missing
   /// directory or file, a missing option, or use before connecting.
   #[error("{0}")]
   Configuration(String),

   /// IO error when accessing database files. Standard library IO errors
   /// are converted to this variant.
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// Engine has been closed and cannot be used
   #[error("Database has been closed")]
   DatabaseClosed,
}

impl Error {
   /// Shorthand for a [`Error::Configuration`] with the given message.
   pub fn configuration(message: impl Into<String>) -> Self {
      Error::Configuration(message.into())
   }
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
