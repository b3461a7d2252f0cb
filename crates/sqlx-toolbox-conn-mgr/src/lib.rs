//! # sqlx-toolbox-conn-mgr
//!
//! A minimal wrapper around SQLx that gives SQLite and PostgreSQL the same
//! engine/session vocabulary.
//!
//! ## Core Types
//!
//! - **[`Config`]**: Ordered key/value description of a connection
//! - **[`Engine`]**: Lazily-connecting pool for one connection URL
//! - **[`Session`]**: Unit of work; opens a transaction on its first write
//! - **[`SessionFactory`]**: Builds sessions bound to an engine
//! - **[`ScopedSession`]**: Registry giving each thread its own session
//! - **[`Error`]**: Error type for configuration and database operations

mod config;
mod engine;
mod error;
mod scoped;
mod session;

// Re-export public types
pub use config::{
   Config, DATABASE_HOST, DATABASE_NAME, DATABASE_PASSWORD, DATABASE_PATH, DATABASE_TYPE,
   DATABASE_URL, DATABASE_USERNAME, DatabaseType, PoolConfig, redact_url,
};
pub use engine::Engine;
pub use error::{Error, Result};
pub use scoped::ScopedSession;
pub use session::{Session, SessionFactory};
