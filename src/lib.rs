//! # sqlx-toolbox
//!
//! Binds a sqlx engine, thread-scoped sessions, declarative model metadata,
//! offset pagination and alembic configuration to a single [`Toolbox`].
//!
//! - **[`Toolbox::connect_sqlite`] / [`Toolbox::connect_postgresql`]**: build
//!   the connection configuration, engine and session registry
//! - **[`ModelExt`]**: `M::query(&toolbox)` / `M::session(&toolbox)`
//! - **[`PageQuery`]**: axum extractor for `page` / `per_page`
//! - **[`Toolbox::initialize_migrations`]**: point `alembic.ini` at the
//!   current database
//!
//! Sessions, queries and pagination come from the `sqlx-toolbox-conn-mgr`
//! and `sqlx-toolbox-query` crates and are re-exported here.

mod error;
mod metadata;
pub mod migrations;
mod toolbox;
mod web;

pub use error::{Error, Result};
pub use metadata::Metadata;
pub use migrations::configure_alembic;
pub use toolbox::{ModelExt, PostgresOptions, SqliteOptions, Toolbox};
pub use web::PageQuery;

pub use sqlx_toolbox_conn_mgr::{
   Config, DATABASE_HOST, DATABASE_NAME, DATABASE_PASSWORD, DATABASE_PATH, DATABASE_TYPE,
   DATABASE_URL, DATABASE_USERNAME, DatabaseType, Engine, PoolConfig, Session,
};
pub use sqlx_toolbox_query::{
   Column, ColumnType, Model, PageWindow, Pagination, Query, RequestArgs, SortDirection,
   TableSchema,
};
